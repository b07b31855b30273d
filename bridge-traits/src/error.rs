use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Bridge endpoint disconnected: {0}")]
    Disconnected(String),
}

impl BridgeError {
    /// Returns `true` when the capability itself is missing rather than the
    /// call having failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BridgeError::NotAvailable(_) | BridgeError::Disconnected(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
