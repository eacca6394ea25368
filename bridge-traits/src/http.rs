//! Request/response transport.
//!
//! A 4xx or 5xx is still an `Ok(HttpResponse)` here. `Err` means the exchange
//! itself broke: DNS, TLS, reset connection, timeout.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

/// Outgoing request, assembled with the chained setters below.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set `Authorization: <scheme> <token>`.
    ///
    /// The scheme is whatever the token endpoint reported as `token_type`
    /// (usually `Bearer`).
    pub fn authorization(self, scheme: &str, token: &str) -> Self {
        self.header("Authorization", format!("{} {}", scheme, token))
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| BridgeError::OperationFailed(format!("decoding response body: {e}")))
    }

    /// 2xx only; redirects are not followed at this layer.
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// The one way the session core and Drive connector reach the network.
///
/// No retries and no default timeout are layered on top; a host that wants
/// either adds it in its implementation.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest, HttpMethod};
///
/// async fn fetch_about(client: &dyn HttpClient) -> Result<serde_json::Value> {
///     let request = HttpRequest::new(HttpMethod::Get, "https://www.googleapis.com/drive/v3/about")
///         .authorization("Bearer", "token");
///
///     client.execute(request).await?.json()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform one exchange. Fails only when no response was received.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
