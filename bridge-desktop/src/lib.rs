//! Desktop implementations of the host capabilities.
//!
//! | Capability | Type | Backed by |
//! |------------|------|-----------|
//! | `HttpClient` | [`ReqwestHttpClient`] | reqwest with rustls |
//! | `SecureStore` | `KeyringSecureStore` | OS vault via `keyring` (feature `secure-store`, on by default) |
//! | `UrlOpener` | [`SystemUrlOpener`] | the `open` crate |
//!
//! `core-runtime` falls back to these when built with `desktop-shims` and the
//! host leaves a capability unset. Wiring them explicitly:
//!
//! ```ignore
//! use bridge_desktop::{KeyringSecureStore, ReqwestHttpClient, SystemUrlOpener};
//! use core_runtime::config::{AuthConfig, CoreConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .auth(AuthConfig::new("client-id", "com.example.app:/oauth2redirect")?)
//!     .http_client(Arc::new(ReqwestHttpClient::new()))
//!     .secure_store(Arc::new(KeyringSecureStore::new()))
//!     .url_opener(Arc::new(SystemUrlOpener::new()))
//!     .build()?;
//! ```

mod browser;
mod http;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use browser::SystemUrlOpener;
pub use http::ReqwestHttpClient;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
