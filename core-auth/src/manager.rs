//! Session Lifecycle Manager
//!
//! [`AuthManager`] turns a one-time authorization redirect into a durable,
//! self-refreshing session and publishes the signed-in state.
//!
//! # Concurrency
//!
//! One async mutex (the session lock) serializes everything that reads or
//! writes the credential record. `refresh_token` holds it from load through
//! the network call to persist/delete, so a concurrent `sign_out` can never
//! be overwritten by a refresh that was already in flight. `handle_redirect`
//! performs the code exchange outside the lock and only takes it to persist.
//!
//! # Example
//!
//! ```no_run
//! use core_auth::AuthManager;
//! use futures::StreamExt;
//! # async fn example(config: core_runtime::CoreConfig) -> core_auth::Result<()> {
//! let auth = AuthManager::from_config(&config);
//!
//! let mut signed_in = auth.is_signed_in_stream();
//! if !auth.is_signed_in().await? {
//!     auth.sign_in().await?;
//! }
//!
//! // Later, when the OS hands the redirect back to the app:
//! auth.handle_redirect("com.example.app://?code=4/0Ab").await?;
//! assert_eq!(signed_in.next().await, Some(false));
//! assert_eq!(signed_in.next().await, Some(true));
//! # Ok(())
//! # }
//! ```

use crate::credential_store::CredentialStore;
use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlow;
use crate::session::{SessionState, SessionStream};
use crate::types::Credentials;
use bridge_traits::{Clock, HttpClient, SecureStore, UrlOpener};
use core_runtime::config::{AuthConfig, CoreConfig};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Everything guarded by, or guarding, the credential record.
struct Session {
    store: CredentialStore,
    state: SessionState,
    lock: Mutex<()>,
}

impl Session {
    /// Re-read the store and publish the result. Caller holds `lock`.
    async fn rederive(&self) -> Result<bool> {
        let present = self.store.load().await?.is_some();
        self.state.set(present);
        Ok(present)
    }

    /// Caller holds `lock`.
    async fn persist(&self, credentials: &Credentials) -> Result<()> {
        self.store.save(credentials).await?;
        self.state.set(true);
        Ok(())
    }

    /// Caller holds `lock`.
    async fn clear(&self) -> Result<()> {
        let deleted = self.store.delete().await;
        // Publish whatever the store now says, even if the delete failed.
        if deleted.is_err() {
            if let Err(e) = self.rederive().await {
                warn!(error = %e, "Could not re-read credentials after failed delete");
            }
        } else {
            self.state.set(false);
        }
        deleted
    }
}

/// Session lifecycle manager.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct AuthManager {
    flow: OAuthFlow,
    url_opener: Arc<dyn UrlOpener>,
    clock: Arc<dyn Clock>,
    session: Arc<Session>,
}

impl AuthManager {
    pub fn new(
        config: AuthConfig,
        http_client: Arc<dyn HttpClient>,
        secure_store: Arc<dyn SecureStore>,
        url_opener: Arc<dyn UrlOpener>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = CredentialStore::new(secure_store, config.credential_key());
        Self {
            flow: OAuthFlow::new(config, http_client),
            url_opener,
            clock,
            session: Arc::new(Session {
                store,
                state: SessionState::default(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.auth.clone(),
            Arc::clone(&config.http_client),
            Arc::clone(&config.secure_store),
            Arc::clone(&config.url_opener),
            Arc::clone(&config.clock),
        )
    }

    pub fn config(&self) -> &AuthConfig {
        self.flow.config()
    }

    /// Whether a credential record is stored.
    ///
    /// Always consults the store; the result is also published to
    /// [`is_signed_in_stream`](Self::is_signed_in_stream) subscribers.
    pub async fn is_signed_in(&self) -> Result<bool> {
        let _guard = self.session.lock.lock().await;
        self.session.rederive().await
    }

    /// Subscribe to sign-in state.
    ///
    /// The stream yields the cached value immediately, then every change. A
    /// re-read of the store is scheduled on the current tokio runtime so a
    /// stale cached value is corrected promptly.
    pub fn is_signed_in_stream(&self) -> SessionStream {
        let stream = self.session.state.subscribe();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move {
                    let _guard = session.lock.lock().await;
                    if let Err(e) = session.rederive().await {
                        warn!(error = %e, "Failed to refresh session state for new subscriber");
                    }
                });
            }
            Err(_) => debug!("No tokio runtime; stream starts from cached session state"),
        }

        stream
    }

    /// Send the user to the consent page.
    ///
    /// Completion arrives later through [`handle_redirect`](Self::handle_redirect).
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<()> {
        let url = self.flow.authorization_url()?;
        self.url_opener
            .open_url(&url)
            .await
            .map_err(AuthError::Bridge)?;

        info!("Opened consent page");
        Ok(())
    }

    /// Complete sign-in from the URL the provider redirected to.
    ///
    /// Returns `Ok(false)`, touching nothing, if `url` is not addressed to
    /// the configured redirect URI. On success the credentials are persisted
    /// and `Ok(true)` is returned. On any error the store is left as it was.
    #[instrument(skip(self, url))]
    pub async fn handle_redirect(&self, url: &str) -> Result<bool> {
        let Some(code) = self.flow.parse_redirect(url)? else {
            debug!("Ignoring URL not addressed to the redirect URI");
            return Ok(false);
        };

        let credentials = self.flow.exchange_code(&code, self.clock.now()).await?;

        let _guard = self.session.lock.lock().await;
        self.session.persist(&credentials).await?;

        info!("Signed in");
        Ok(true)
    }

    /// Refresh the access token if it has expired.
    ///
    /// No-op when signed out or when the token is still valid; tokens are
    /// never refreshed ahead of expiry. If the provider rejects the refresh
    /// the credentials are deleted (the session ends) and the rejection is
    /// returned.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> Result<()> {
        let _guard = self.session.lock.lock().await;

        let Some(current) = self.session.store.load().await? else {
            debug!("Not signed in; nothing to refresh");
            return Ok(());
        };

        let now = self.clock.now();
        if !current.is_expired_at(now) {
            debug!(expires_at = %current.expires_at(), "Access token still valid");
            return Ok(());
        }

        match self.flow.refresh(&current, now).await {
            Ok(refreshed) => {
                self.session.persist(&refreshed).await?;
                info!(expires_at = %refreshed.expires_at(), "Access token refreshed");
                Ok(())
            }
            Err(rejected @ AuthError::Response { .. }) => {
                warn!(
                    status = rejected.status_code(),
                    "Refresh rejected; signing out"
                );
                if let Err(e) = self.session.clear().await {
                    warn!(error = %e, "Failed to delete rejected credentials");
                }
                Err(rejected)
            }
            Err(other) => Err(other),
        }
    }

    /// Delete the stored credentials. Idempotent.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let _guard = self.session.lock.lock().await;
        self.session.clear().await?;

        info!("Signed out");
        Ok(())
    }

    /// The stored credentials, if any.
    ///
    /// Does not refresh; call [`refresh_token`](Self::refresh_token) first
    /// when the token is about to be used.
    pub async fn credentials(&self) -> Result<Option<Credentials>> {
        let _guard = self.session.lock.lock().await;
        self.session.store.load().await
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("config", self.flow.config())
            .field("signed_in", &self.session.state.get())
            .finish()
    }
}
