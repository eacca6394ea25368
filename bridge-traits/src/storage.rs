//! Persistent secret storage.
//!
//! The session core keeps one record here (the serialized OAuth credentials)
//! and reads it back whenever it re-derives the signed-in state.

use async_trait::async_trait;

use crate::error::Result;

/// Byte values keyed by string, held somewhere the OS protects.
///
/// Implementations should back onto the platform vault (Keychain, Credential
/// Manager, Secret Service) and must never log stored values.
///
/// ```ignore
/// store.set_secret("gdrive_client.credentials", &record_json).await?;
/// let record = store.get_secret("gdrive_client.credentials").await?;
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Replace whatever is under `key`. Must not leave a partial value behind.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Deleting a missing key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;
}
