use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("capability not exposed by host: {name}")]
    NotExposed { name: &'static str },

    #[error("capability already exposed: {name}")]
    AlreadyExposed { name: &'static str },

    #[error("capability {name} signature mismatch: host exposes {exposed}, caller expects {expected}")]
    SignatureMismatch {
        name: &'static str,
        exposed: String,
        expected: String,
    },

    #[error("capability {name} failed on host: {message}")]
    HostFailure { name: &'static str, message: String },
}

impl BridgeError {
    pub fn capability_name(&self) -> &'static str {
        match self {
            BridgeError::NotExposed { name }
            | BridgeError::AlreadyExposed { name }
            | BridgeError::SignatureMismatch { name, .. }
            | BridgeError::HostFailure { name, .. } => *name,
        }
    }
}
