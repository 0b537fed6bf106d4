//! Host functions exposed to the UI.

use std::sync::Arc;

use crate::app_core::Core;
use crate::bridge::capabilities::{CALL_ME, LOG_TEST_MSG};
use crate::bridge::{BridgeError, CapabilityRegistry, Requirement};

/// Capabilities the UI cannot run without; checked before the first frame.
pub fn required() -> Vec<Requirement> {
    vec![LOG_TEST_MSG.requirement()]
}

pub fn expose_all(registry: &mut CapabilityRegistry, core: Arc<Core>) -> Result<(), BridgeError> {
    registry.expose(LOG_TEST_MSG, move |()| {
        core.test_function();
        Ok(())
    })?;

    registry.expose(CALL_ME, |(a, b): (f64, f64)| {
        tracing::info!(target: "host", "Called with: a = {a}, b = {b}");
        Ok(a + b)
    })?;

    Ok(())
}
