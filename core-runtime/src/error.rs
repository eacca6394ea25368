use thiserror::Error;

/// Errors raised while assembling a [`CoreConfig`](crate::config::CoreConfig)
/// or installing logging.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No host implementation was injected and this build has no default.
    #[error("no {capability} available: {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
