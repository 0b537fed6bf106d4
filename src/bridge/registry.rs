use std::any::Any;
use std::collections::HashMap;

use anyhow::anyhow;

use crate::bridge::capability::{Capability, Requirement, Signature};
use crate::bridge::error::BridgeError;

type ErasedValue = Box<dyn Any + Send>;
type ErasedHandler = Box<dyn Fn(ErasedValue) -> anyhow::Result<ErasedValue> + Send + Sync>;

struct Entry {
    signature: Signature,
    handler: ErasedHandler,
}

/// Host functions keyed by capability name.
///
/// Built mutably during startup, then shared read-only (usually as
/// `Arc<CapabilityRegistry>`). Every lookup checks the caller's signature
/// against the exposed one before the handler runs.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, Entry>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expose<A, R, F>(&mut self, capability: Capability<A, R>, handler: F) -> Result<(), BridgeError>
    where
        A: Send + 'static,
        R: Send + 'static,
        F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let name = capability.name();
        if self.entries.contains_key(name) {
            return Err(BridgeError::AlreadyExposed { name });
        }

        let handler: ErasedHandler = Box::new(move |args: ErasedValue| {
            let args = args
                .downcast::<A>()
                .map_err(|_| anyhow!("argument type mismatch for {name}"))?;
            let ret = handler(*args)?;
            Ok(Box::new(ret) as ErasedValue)
        });

        self.entries.insert(
            name,
            Entry {
                signature: capability.signature(),
                handler,
            },
        );
        tracing::debug!(target: "aknet::bridge", capability = name, "exposed");
        Ok(())
    }

    /// Resolves `capability` by name and runs the host handler.
    pub fn invoke<A, R>(&self, capability: Capability<A, R>, args: A) -> Result<R, BridgeError>
    where
        A: Send + 'static,
        R: Send + 'static,
    {
        let name = capability.name();
        let entry = self.lookup(capability.requirement())?;

        tracing::debug!(target: "aknet::bridge", capability = name, "invoke");

        let ret = (entry.handler)(Box::new(args)).map_err(|err| {
            tracing::warn!(target: "aknet::bridge", capability = name, "host failure: {err:#}");
            BridgeError::HostFailure {
                name,
                message: format!("{err:#}"),
            }
        })?;

        ret.downcast::<R>()
            .map(|ret| *ret)
            .map_err(|_| BridgeError::SignatureMismatch {
                name,
                exposed: entry.signature.to_string(),
                expected: capability.signature().to_string(),
            })
    }

    /// Checks every requirement and reports the first one that fails.
    pub fn ensure_all(&self, requirements: &[Requirement]) -> Result<(), BridgeError> {
        for requirement in requirements {
            self.lookup(*requirement)?;
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, requirement: Requirement) -> Result<&Entry, BridgeError> {
        let name = requirement.name;
        let entry = self
            .entries
            .get(name)
            .ok_or(BridgeError::NotExposed { name })?;

        if !entry.signature.matches(&requirement.signature) {
            return Err(BridgeError::SignatureMismatch {
                name,
                exposed: entry.signature.to_string(),
                expected: requirement.signature.to_string(),
            });
        }

        Ok(entry)
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}
