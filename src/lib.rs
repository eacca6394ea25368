//! # gdrive-client
//!
//! OAuth2-authenticated Google Drive v3 client with a self-refreshing session.
//!
//! This crate re-exports the workspace crates so applications can depend on
//! one package. With the default `desktop-shims` feature,
//! [`CoreConfig::builder`] fills in the desktop HTTP client, keyring store and
//! browser opener.
//!
//! ```no_run
//! use gdrive_client::{AuthConfig, CoreConfig, DriveApi, DriveClient, ListFilesParams};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthConfig::new("1234.apps.googleusercontent.com", "com.example.app://")?;
//! let client = DriveClient::new(CoreConfig::builder().auth(auth).build()?);
//!
//! if !client.auth().is_signed_in().await? {
//!     client.auth().sign_in().await?;
//!     // ... hand the redirect to client.auth().handle_redirect(url)
//! }
//!
//! let page = client.drive().list_files(ListFilesParams::default()).await?;
//! for file in page.files {
//!     println!("{} {}", file.id, file.name);
//! }
//! # Ok(())
//! # }
//! ```

pub use bridge_traits;
pub use core_auth;
pub use core_runtime;
pub use provider_google_drive;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_auth::{AuthError, AuthManager, Credentials, SessionStream};
pub use core_runtime::{AuthConfig, CoreConfig, CoreConfigBuilder};
pub use provider_google_drive::{
    About, CreateFileParams, DeleteFileParams, DriveApi, DriveClient, File, FileMetadata,
    FilesList, GoogleDriveConnector, GoogleDriveError, ListFilesParams, UpdateFileDataParams,
};
