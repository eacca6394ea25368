//! URL Opener Abstraction
//!
//! Sign-in hands the provider's consent page to the host; the host decides
//! whether that is a system browser, an in-app web view or a printed link.

use async_trait::async_trait;

use crate::error::Result;

/// Launch a URL outside the core.
///
/// The call returns once the host has accepted the URL, not once the user
/// finishes with it. Completion of the flow arrives separately through the
/// redirect URI.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    /// Open `url` in the host's browser.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotAvailable`](crate::BridgeError::NotAvailable)
    /// when the host has no way to display URLs, or
    /// [`BridgeError::OperationFailed`](crate::BridgeError::OperationFailed)
    /// when launching failed.
    async fn open_url(&self, url: &str) -> Result<()>;
}
