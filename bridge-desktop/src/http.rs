//! `HttpClient` over reqwest.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::{header::HeaderMap, Client, Method, RequestBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("gdrive-client/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Desktop transport.
///
/// Each call is a single attempt. Any status code comes back as a response;
/// only transport failures are errors.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Overall per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let built = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build();

        match built {
            Ok(client) => Self { client },
            Err(e) => {
                warn!(error = %e, "reqwest client setup failed, using defaults");
                Self {
                    client: Client::new(),
                }
            }
        }
    }

    fn prepare(&self, request: HttpRequest) -> RequestBuilder {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = headers
            .into_iter()
            .fold(self.client.request(method_of(method), url), |b, (k, v)| {
                b.header(k, v)
            });
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn transport_error(e: reqwest::Error) -> BridgeError {
    let detail = if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    };
    BridgeError::OperationFailed(format!("HTTP transport: {detail}"))
}

/// Header values that are not visible ASCII are dropped.
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        debug!(?method, "sending request");

        let response = self.prepare(request).send().await.map_err(|e| {
            warn!(error = %e, "request did not complete");
            transport_error(e)
        })?;

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;

        debug!(status, bytes = body.len(), "response read");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
