use bridge_traits::BridgeError;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The provider redirected back with `error=<message>`
    #[error("Authorization was rejected: {0}")]
    CodeError(String),

    #[error("Redirect URL carries neither a code nor an error")]
    CodeNotFoundInRedirectUrl,

    /// The token endpoint answered with a non-2xx status
    #[error("Token endpoint returned HTTP {status_code} ({} bytes)", body.len())]
    Response { status_code: u16, body: Bytes },

    #[error("Network error: {0}")]
    Network(#[source] BridgeError),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Host bridge error: {0}")]
    Bridge(#[source] BridgeError),
}

impl AuthError {
    /// HTTP status of a provider rejection, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AuthError::Response { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
