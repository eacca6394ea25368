//! # Google Drive Provider
//!
//! Google Drive API v3 file operations on top of the host bridges.
//!
//! ## Overview
//!
//! [`GoogleDriveConnector`] implements [`DriveApi`]: about, list, get,
//! download, multipart create, content update and delete. Each call refreshes
//! an expired token through the shared [`AuthManager`](core_auth::AuthManager)
//! before it goes out. [`DriveClient`] wires both from a
//! [`CoreConfig`](core_runtime::CoreConfig).

pub mod client;
pub mod connector;
pub mod error;
pub mod multipart;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::DriveClient;
pub use connector::{DriveApi, GoogleDriveConnector};
pub use error::{GoogleDriveError, Result};
pub use types::{
    About, CreateFileParams, DeleteFileParams, File, FileMetadata, FilesList, ListFilesParams,
    StorageQuota, UpdateFileDataParams, User, FOLDER_MIME_TYPE,
};
