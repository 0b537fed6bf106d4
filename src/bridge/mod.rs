//! Typed bridge from UI code to host capabilities.
//!
//! Host code exposes functions under a symbolic name with a fixed
//! argument/return signature. UI code holds a [`capability::Capability`] handle carrying
//! the same name and signature and invokes it through the shared
//! [`CapabilityRegistry`].

pub mod capability;
pub mod error;
pub mod registry;

pub use capability::{Requirement, capabilities};
pub use error::BridgeError;
pub use registry::CapabilityRegistry;
