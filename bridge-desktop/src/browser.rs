//! System browser launcher

use async_trait::async_trait;
use bridge_traits::{
    browser::UrlOpener,
    error::{BridgeError, Result},
};
use tracing::{debug, warn};

/// Opens URLs with the desktop's default handler.
///
/// An optional preferred application is tried first (e.g. `"firefox"`),
/// falling back to the default browser if it cannot be launched.
#[derive(Debug, Clone, Default)]
pub struct SystemUrlOpener {
    preferred_app: Option<String>,
}

impl SystemUrlOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(app: impl Into<String>) -> Self {
        Self {
            preferred_app: Some(app.into()),
        }
    }

    fn launch(url: &str, preferred_app: Option<&str>) -> std::io::Result<()> {
        if let Some(app) = preferred_app {
            match open::with_detached(url, app) {
                Ok(()) => return Ok(()),
                Err(e) => warn!(app, error = %e, "Preferred browser failed, using default"),
            }
        }
        open::that_detached(url)
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open_url(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        let preferred_app = self.preferred_app.clone();

        // `open` may block while the platform launcher starts.
        tokio::task::spawn_blocking(move || Self::launch(&url, preferred_app.as_deref()))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Browser launch task failed: {}", e)))?
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to open browser: {}", e)))?;

        debug!("Opened consent page in system browser");
        Ok(())
    }
}
