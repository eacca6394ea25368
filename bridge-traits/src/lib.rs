//! Host capabilities for the Drive client.
//!
//! Nothing in `core-auth` or `provider-google-drive` touches the network, the
//! OS credential vault, the browser or the wall clock directly. Each of those
//! is one of the traits here, handed in through `CoreConfig` and shared as
//! `Arc<dyn Trait>`; every trait is therefore `Send + Sync`.
//!
//! | Trait | Used for |
//! |-------|----------|
//! | [`HttpClient`] | token endpoint and Drive REST calls |
//! | [`SecureStore`] | the persisted OAuth credential record |
//! | [`UrlOpener`] | showing the consent page |
//! | [`Clock`] | token expiry checks |
//! | [`IdGenerator`] | multipart upload boundaries |
//! | [`LoggerSink`] | forwarding log events to host logging |
//!
//! `bridge-desktop` provides reqwest, keyring and `open` based
//! implementations. Failures from any of them surface as [`BridgeError`].
//!
//! ```ignore
//! use async_trait::async_trait;
//! use bridge_traits::{error::Result, HttpClient, HttpRequest, HttpResponse};
//!
//! struct PlatformHttp;
//!
//! #[async_trait]
//! impl HttpClient for PlatformHttp {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         platform_fetch(request).await
//!     }
//! }
//! ```

pub mod browser;
pub mod error;
pub mod http;
pub mod id;
pub mod logger;
pub mod storage;
pub mod time;

pub use browser::UrlOpener;
pub use error::BridgeError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use id::{IdGenerator, RandomIdGenerator};
pub use logger::{LogEntry, LogLevel, LoggerSink};
pub use storage::SecureStore;
pub use time::{Clock, SystemClock};
