use chrono::{DateTime, Duration, Utc};

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth credentials for the signed-in user.
///
/// At most one record exists per application identity; its presence in the
/// secure store is what "signed in" means.
///
/// # Security
///
/// The `Debug` implementation redacts both tokens.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use core_auth::Credentials;
///
/// let issued = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let credentials = Credentials::issued_at(
///     "ya29.access".to_string(),
///     3600,
///     "1//refresh".to_string(),
///     "Bearer".to_string(),
///     issued,
/// )?;
///
/// assert!(!credentials.is_expired_at(issued));
/// assert_eq!(credentials.authorization_value(), "Bearer ya29.access");
/// # Ok::<(), core_auth::AuthError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    access_token: String,
    expires_at: DateTime<Utc>,
    refresh_token: String,
    token_type: String,
}

impl Credentials {
    pub fn new(
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: String,
        token_type: String,
    ) -> Self {
        Self {
            access_token,
            expires_at,
            refresh_token,
            token_type,
        }
    }

    /// Build credentials from a token response received at `now`.
    ///
    /// An `expires_in` that puts the expiry outside the representable range
    /// is [`AuthError::Serialization`].
    pub fn issued_at(
        access_token: String,
        expires_in_secs: i64,
        refresh_token: String,
        token_type: String,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let expires_at = Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::Serialization(format!("expires_in out of range: {expires_in_secs}"))
            })?;

        Ok(Self::new(access_token, expires_at, refresh_token, token_type))
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// `true` once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Value for the `Authorization` header: `<token_type> <access_token>`.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}
