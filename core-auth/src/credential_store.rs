//! Credential Persistence
//!
//! Stores the single [`Credentials`] record as JSON in the host's
//! [`SecureStore`] under a fixed key.
//!
//! ## Security
//!
//! - Token values never appear in logs or error messages
//! - A record that no longer decodes is deleted and reported as absent, so
//!   a corrupted keychain entry reads as "signed out" instead of wedging
//!   every later call
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{CredentialStore, Credentials};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>, credentials: Credentials) -> core_auth::Result<()> {
//! let store = CredentialStore::new(secure_store, "gdrive_client.credentials");
//!
//! store.save(&credentials).await?;
//! assert!(store.load().await?.is_some());
//! store.delete().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::Credentials;
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Secure storage for the session's credentials
#[derive(Clone)]
pub struct CredentialStore {
    secure_store: Arc<dyn SecureStore>,
    key: String,
}

impl CredentialStore {
    pub fn new(secure_store: Arc<dyn SecureStore>, key: impl Into<String>) -> Self {
        Self {
            secure_store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist `credentials`, replacing any previous record.
    ///
    /// Encoding happens before the store is touched, so a failure leaves the
    /// previous record intact.
    pub async fn save(&self, credentials: &Credentials) -> Result<()> {
        let json = serde_json::to_vec(credentials).map_err(|e| {
            warn!(error = %e, "Failed to serialize credentials");
            AuthError::Serialization(format!("credential encoding failed: {}", e))
        })?;

        self.secure_store
            .set_secret(&self.key, &json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store credentials in secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(expires_at = %credentials.expires_at(), "Credentials stored securely");
        Ok(())
    }

    /// Load the stored record.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored bytes were
    /// unreadable (in which case they are deleted).
    pub async fn load(&self) -> Result<Option<Credentials>> {
        let data = self.secure_store.get_secret(&self.key).await.map_err(|e| {
            warn!(error = %e, "Failed to read credentials from secure storage");
            AuthError::SecureStorageUnavailable(e.to_string())
        })?;

        let Some(data) = data else {
            debug!("No credentials in storage");
            return Ok(None);
        };

        match serde_json::from_slice::<Credentials>(&data) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                warn!(error = %e, "Stored credentials are corrupted, discarding them");

                if let Err(delete_err) = self.secure_store.delete_secret(&self.key).await {
                    warn!(error = %delete_err, "Failed to delete corrupted credentials");
                }

                Ok(None)
            }
        }
    }

    /// Remove the stored record. Succeeds when nothing is stored.
    pub async fn delete(&self) -> Result<()> {
        self.secure_store
            .delete_secret(&self.key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete credentials from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!("Credentials deleted");
        Ok(())
    }
}
