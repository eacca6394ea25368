//! Ready-to-use Drive client assembled from a [`CoreConfig`].

use core_auth::AuthManager;
use core_runtime::config::CoreConfig;
use std::sync::Arc;
use tracing::info;

use crate::connector::GoogleDriveConnector;

/// Session manager plus file operations sharing one credential record.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct DriveClient {
    auth: AuthManager,
    drive: GoogleDriveConnector,
}

impl DriveClient {
    pub fn new(config: CoreConfig) -> Self {
        let auth = AuthManager::from_config(&config);
        let drive = GoogleDriveConnector::new(
            auth.clone(),
            Arc::clone(&config.http_client),
            Arc::clone(&config.id_generator),
        );

        info!(client_id = %config.auth.client_id(), "Drive client ready");
        Self { auth, drive }
    }

    /// Sign-in, redirect handling, sign-out and state observation.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// File operations; see [`DriveApi`](crate::DriveApi).
    pub fn drive(&self) -> &GoogleDriveConnector {
        &self.drive
    }
}
