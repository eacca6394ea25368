//! # Authentication Module
//!
//! OAuth 2.0 session lifecycle for the Google Drive client.
//!
//! ## Overview
//!
//! A one-time authorization redirect becomes a durable credential record in
//! the host's secure store. The access token is refreshed only once it has
//! expired, and a rejected refresh ends the session. Sign-in state is
//! observable as a stream.
//!
//! ## Components
//!
//! - [`AuthManager`] - the public session API
//! - [`OAuthFlow`] - consent URL, redirect parsing, token endpoint calls
//! - [`CredentialStore`] - JSON persistence of [`Credentials`]
//! - [`SessionState`] - cached sign-in flag with change fan-out
//!
//! ## Features
//!
//! - Authorization code grant against Google's endpoints
//! - Rotated refresh tokens replace the stored one; otherwise it is kept
//! - Corrupted stored records read as signed out
//! - Tokens and codes never reach the logs

pub mod credential_store;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod session;
pub mod types;

pub use credential_store::CredentialStore;
pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use oauth::OAuthFlow;
pub use session::{SessionState, SessionStream};
pub use types::Credentials;
