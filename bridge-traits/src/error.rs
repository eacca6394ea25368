use thiserror::Error;

/// Failure reported by a host capability.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The capability exists but cannot be reached right now (locked
    /// keychain, no browser, no network stack).
    #[error("host capability unavailable: {0}")]
    NotAvailable(String),

    #[error("host operation failed: {0}")]
    OperationFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
