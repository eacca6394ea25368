//! OAuth 2.0 Authorization Code Flow
//!
//! Stateless request/response mapping for Google's OAuth endpoints:
//! - Building the consent-page URL
//! - Extracting the code (or error) from the redirect
//! - Exchanging the code for credentials
//! - Minting a new access token from the refresh token
//!
//! Persistence and session state live in [`AuthManager`](crate::AuthManager);
//! nothing here touches storage.
//!
//! # Security
//!
//! Codes and tokens are never logged; instrumented functions skip them.
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::OAuthFlow;
//! use core_runtime::config::AuthConfig;
//! use std::sync::Arc;
//!
//! # async fn example(http_client: Arc<dyn bridge_traits::HttpClient>) -> core_auth::Result<()> {
//! let config = AuthConfig::new("client-id", "com.example.app://").unwrap();
//! let flow = OAuthFlow::new(config, http_client);
//!
//! let consent_url = flow.authorization_url()?;
//! // ... user consents, app receives "com.example.app://?code=4/0Ab..."
//! if let Some(code) = flow.parse_redirect("com.example.app://?code=4/0Ab")? {
//!     let credentials = flow.exchange_code(&code, chrono::Utc::now()).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::Credentials;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_runtime::config::AuthConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Consent page the user is sent to.
pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Endpoint for the authorization-code grant.
pub const CODE_EXCHANGE_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v4/token";

/// Endpoint for the refresh-token grant.
pub const REFRESH_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Google's OAuth endpoints bound to one application identity.
#[derive(Clone)]
pub struct OAuthFlow {
    config: AuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlow {
    pub fn new(config: AuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// URL of the consent page for this application.
    pub fn authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            AUTHORIZATION_ENDPOINT,
            &[
                ("client_id", self.config.client_id()),
                ("response_type", "code"),
                ("scope", self.config.auth_scope()),
                ("redirect_uri", self.config.redirect_uri()),
            ],
        )
        .map_err(|e| AuthError::Serialization(format!("Invalid authorization URL: {}", e)))?;

        Ok(url.into())
    }

    /// Pull the authorization code out of a redirect.
    ///
    /// Returns `Ok(None)` when `url` is not addressed to this application's
    /// redirect URI. An `error` parameter takes precedence over `code`.
    ///
    /// The query is parsed by hand rather than through [`Url`] because
    /// custom-scheme redirect URIs (`com.example.app:/oauth2`) are not
    /// always valid absolute URLs once the provider appends to them.
    pub fn parse_redirect(&self, url: &str) -> Result<Option<String>> {
        if !url.starts_with(self.config.redirect_uri()) {
            return Ok(None);
        }

        let query = url
            .split_once('?')
            .map(|(_, rest)| rest.split('#').next().unwrap_or_default())
            .unwrap_or_default();

        let mut code = None;
        let mut error = None;
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "code" if code.is_none() => code = Some(value.into_owned()),
                "error" if error.is_none() => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            warn!(error = %error, "Provider rejected authorization");
            return Err(AuthError::CodeError(error));
        }

        code.map(Some).ok_or(AuthError::CodeNotFoundInRedirectUrl)
    }

    /// Exchange an authorization code for credentials.
    ///
    /// `now` is the instant the response is considered received; expiry is
    /// computed from it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] when the request could not be sent
    /// - [`AuthError::Response`] on a non-2xx status
    /// - [`AuthError::Serialization`] when the body is not a complete token
    ///   response (including a missing `refresh_token`)
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str, now: DateTime<Utc>) -> Result<Credentials> {
        debug!("Exchanging authorization code for tokens");

        let body = encode_form(&[
            ("code", code),
            ("client_id", self.config.client_id()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri()),
        ])?;

        let response = self.post_form(CODE_EXCHANGE_ENDPOINT, body).await?;
        let token: TokenResponse = decode_token_response(&response)?;

        let refresh_token = token.refresh_token.ok_or_else(|| {
            AuthError::Serialization("Token response is missing refresh_token".to_string())
        })?;

        info!(expires_in = token.expires_in, "Exchanged authorization code for tokens");

        Credentials::issued_at(
            token.access_token,
            token.expires_in,
            refresh_token,
            token.token_type,
            now,
        )
    }

    /// Mint a new access token from `current`'s refresh token.
    ///
    /// The refresh token is carried over unless the provider rotated it.
    #[instrument(skip(self, current))]
    pub async fn refresh(&self, current: &Credentials, now: DateTime<Utc>) -> Result<Credentials> {
        debug!("Refreshing access token");

        let body = encode_form(&[
            ("client_id", self.config.client_id()),
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token()),
        ])?;

        let response = self.post_form(REFRESH_ENDPOINT, body).await?;
        let token: TokenResponse = decode_token_response(&response)?;

        let rotated = token.refresh_token.is_some();
        let refresh_token = token
            .refresh_token
            .unwrap_or_else(|| current.refresh_token().to_string());

        info!(
            expires_in = token.expires_in,
            rotated_refresh_token = rotated,
            "Refreshed access token"
        );

        Credentials::issued_at(
            token.access_token,
            token.expires_in,
            refresh_token,
            token.token_type,
            now,
        )
    }

    async fn post_form(&self, endpoint: &str, body: Bytes) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Post, endpoint)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(AuthError::Network)?;

        if !response.is_success() {
            warn!(
                status = response.status,
                endpoint, "Token endpoint rejected the request"
            );
            return Err(AuthError::Response {
                status_code: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    token_type: String,
}

fn encode_form(pairs: &[(&str, &str)]) -> Result<Bytes> {
    serde_urlencoded::to_string(pairs)
        .map(Bytes::from)
        .map_err(|e| AuthError::Serialization(format!("Failed to encode token request: {}", e)))
}

fn decode_token_response(response: &HttpResponse) -> Result<TokenResponse> {
    response
        .json()
        .map_err(|e| AuthError::Serialization(format!("Failed to parse token response: {}", e)))
}
