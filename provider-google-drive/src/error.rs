//! Failures of Drive operations.

use bridge_traits::error::BridgeError;
use bytes::Bytes;
use core_auth::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// Nothing stored in the session; the call was never sent.
    #[error("Not signed in to Google Drive")]
    NotAuthorized,

    /// The API answered with a non-2xx status
    #[error("Google Drive API error (status {status_code}): {}", String::from_utf8_lossy(body))]
    Response { status_code: u16, body: Bytes },

    /// Refreshing the session before the call failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Drive request did not complete: {0}")]
    Network(#[from] BridgeError),

    /// 2xx with a body that is not the expected resource.
    #[error("unexpected Drive response body: {0}")]
    ParseError(String),
}

impl GoogleDriveError {
    /// HTTP status of an API rejection, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GoogleDriveError::Response { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GoogleDriveError>;
