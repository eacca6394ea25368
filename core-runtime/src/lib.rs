//! Construction-time plumbing shared by the Drive client crates.
//!
//! [`config`] validates the OAuth application settings and bundles the host
//! capabilities into a [`CoreConfig`]. [`logging`] installs the `tracing`
//! subscriber and the optional host log sink.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AuthConfig, CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
