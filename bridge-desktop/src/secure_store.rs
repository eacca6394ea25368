//! `SecureStore` backed by the OS credential vault.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::{debug, error};

const DEFAULT_SERVICE_NAME: &str = "gdrive-client";

/// One keyring entry per key, all under a single service name.
///
/// Keychain on macOS, Credential Manager on Windows, Secret Service on Linux.
/// Entries only hold text, so values are base64 on the way in and out.
#[derive(Debug, Clone)]
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service_name(DEFAULT_SERVICE_NAME)
    }

    /// Namespace entries under the host application's identifier.
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(vault_error)
    }

    /// Missing entries read as `None`.
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(encoded) => Ok(Some(encoded)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(vault_error(e)),
        }
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A locked or unreachable vault is `NotAvailable`; anything else failed.
fn vault_error(e: keyring::Error) -> BridgeError {
    match e {
        keyring::Error::NoStorageAccess(inner) | keyring::Error::PlatformFailure(inner) => {
            BridgeError::NotAvailable(format!("credential vault unreachable: {inner}"))
        }
        other => BridgeError::OperationFailed(format!("credential vault: {other}")),
    }
}

fn decode(key: &str, encoded: &str) -> Result<Vec<u8>> {
    STANDARD.decode(encoded).map_err(|e| {
        error!(key, error = %e, "stored secret is not valid base64");
        BridgeError::OperationFailed(format!("corrupt secret under {key}: {e}"))
    })
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entry(key)?
            .set_password(&STANDARD.encode(value))
            .map_err(vault_error)?;
        debug!(key, "secret written");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(encoded) = self.read(key)? else {
            debug!(key, "no secret stored");
            return Ok(None);
        };
        decode(key, &encoded).map(Some)
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(key, "secret removed");
                Ok(())
            }
            Err(e) => Err(vault_error(e)),
        }
    }
}
