//! # Client Configuration
//!
//! Application identity ([`AuthConfig`]) and the capability bundle
//! ([`CoreConfig`]) the Drive client is constructed from.
//!
//! ## Overview
//!
//! `CoreConfig` is assembled with a builder that fails fast: the OAuth
//! application settings are validated when [`AuthConfig`] is created, and
//! `build()` refuses to produce a config with a missing capability.
//!
//! ## Capabilities
//!
//! - `HttpClient` - required (desktop default: reqwest)
//! - `SecureStore` - required (desktop default: OS keyring)
//! - `UrlOpener` - required (desktop default: system browser)
//! - `Clock` - optional, defaults to [`SystemClock`]
//! - `IdGenerator` - optional, defaults to [`RandomIdGenerator`]
//!
//! When the `desktop-shims` feature is enabled the desktop implementations
//! are injected for any required capability that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AuthConfig, CoreConfig};
//! use std::sync::Arc;
//!
//! let auth = AuthConfig::new(
//!     "1234.apps.googleusercontent.com",
//!     "com.googleusercontent.apps.1234:/oauth2redirect",
//! )?;
//!
//! let config = CoreConfig::builder()
//!     .auth(auth)
//!     .http_client(Arc::new(MyHttpClient))
//!     .secure_store(Arc::new(MySecureStore))
//!     .url_opener(Arc::new(MyUrlOpener))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    Clock, HttpClient, IdGenerator, RandomIdGenerator, SecureStore, SystemClock, UrlOpener,
};
use std::sync::Arc;
use url::Url;

/// Full read/write access to the user's Drive.
pub const DEFAULT_AUTH_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Secure-store key the credential record is kept under.
pub const DEFAULT_CREDENTIAL_KEY: &str = "gdrive_client.credentials";

pub const ENV_CLIENT_ID: &str = "GDRIVE_CLIENT_ID";
pub const ENV_REDIRECT_URI: &str = "GDRIVE_REDIRECT_URI";
pub const ENV_AUTH_SCOPE: &str = "GDRIVE_AUTH_SCOPE";

/// OAuth application settings.
///
/// Immutable once built. Every constructor validates its input, so an
/// `AuthConfig` value always yields a well-formed authorization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    client_id: String,
    redirect_uri: String,
    auth_scope: String,
    credential_key: String,
}

impl AuthConfig {
    /// Create a config with the default Drive scope.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `client_id` is empty or contains whitespace, or
    /// `redirect_uri` is not an absolute URI without a fragment.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Result<Self> {
        let config = Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            auth_scope: DEFAULT_AUTH_SCOPE.to_string(),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Result<Self> {
        self.auth_scope = scope.into();
        self.validate()?;
        Ok(self)
    }

    /// Keep the credential record under a different secure-store key.
    ///
    /// Useful when several applications share one keyring service.
    pub fn with_credential_key(mut self, key: impl Into<String>) -> Result<Self> {
        self.credential_key = key.into();
        self.validate()?;
        Ok(self)
    }

    /// Read `GDRIVE_CLIENT_ID`, `GDRIVE_REDIRECT_URI` and the optional
    /// `GDRIVE_AUTH_SCOPE` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| Error::Config(format!("{} is not set", name)))
        };

        let config = Self::new(required(ENV_CLIENT_ID)?, required(ENV_REDIRECT_URI)?)?;
        match lookup(ENV_AUTH_SCOPE) {
            Some(scope) => config.with_scope(scope),
            None => Ok(config),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn auth_scope(&self) -> &str {
        &self.auth_scope
    }

    pub fn credential_key(&self) -> &str {
        &self.credential_key
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("Client ID cannot be empty".to_string()));
        }
        if self.client_id.chars().any(char::is_whitespace) {
            return Err(Error::Config(
                "Client ID must not contain whitespace".to_string(),
            ));
        }

        let redirect = Url::parse(&self.redirect_uri).map_err(|e| {
            Error::Config(format!(
                "Redirect URI '{}' is not an absolute URI: {}",
                self.redirect_uri, e
            ))
        })?;
        if redirect.fragment().is_some() {
            return Err(Error::Config(
                "Redirect URI must not contain a fragment".to_string(),
            ));
        }

        if self.auth_scope.trim().is_empty() {
            return Err(Error::Config("Auth scope cannot be empty".to_string()));
        }
        if self.credential_key.trim().is_empty() {
            return Err(Error::Config("Credential key cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Everything the Drive client needs from its host.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// OAuth application settings
    pub auth: AuthConfig,

    /// Transport for token and Drive API requests
    pub http_client: Arc<dyn HttpClient>,

    /// Credential persistence
    pub secure_store: Arc<dyn SecureStore>,

    /// Shows the consent page to the user
    pub url_opener: Arc<dyn UrlOpener>,

    /// Time source for token expiry
    pub clock: Arc<dyn Clock>,

    /// Multipart boundary source
    pub id_generator: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("auth", &self.auth)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("url_opener", &"UrlOpener { ... }")
            .field("clock", &"Clock { ... }")
            .field("id_generator", &"IdGenerator { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: enable the 'desktop-shims' feature to use the default. \
             Other hosts: inject a platform implementation through CoreConfig::builder().",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Ok(Arc::new(bridge_desktop::ReqwestHttpClient::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing("HttpClient", "token and Drive API requests"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Ok(Arc::new(bridge_desktop::KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(capability_missing("SecureStore", "credential persistence"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_url_opener() -> Result<Arc<dyn UrlOpener>> {
    Ok(Arc::new(bridge_desktop::SystemUrlOpener::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_url_opener() -> Result<Arc<dyn UrlOpener>> {
    Err(capability_missing("UrlOpener", "showing the consent page"))
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    auth: Option<AuthConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    url_opener: Option<Arc<dyn UrlOpener>>,
    clock: Option<Arc<dyn Clock>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl CoreConfigBuilder {
    /// Sets the OAuth application settings (required).
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn url_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.url_opener = Some(opener);
        self
    }

    /// Override the time source. Tests use this to control token expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no [`AuthConfig`] was supplied
    /// - [`Error::CapabilityMissing`] if a required capability is absent and
    ///   no desktop default is available
    pub fn build(self) -> Result<CoreConfig> {
        let auth = self.auth.ok_or_else(|| {
            Error::Config("Auth configuration is required. Use .auth() to set it.".to_string())
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let url_opener = match self.url_opener {
            Some(opener) => opener,
            None => provide_default_url_opener()?,
        };

        Ok(CoreConfig {
            auth,
            http_client,
            secure_store,
            url_opener,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(RandomIdGenerator)),
        })
    }
}
