use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GeocodioError;

pub const DEFAULT_BASE_URL: &str = "https://api.geocod.io/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Value of the fixed `format` parameter sent with every request.
const RESPONSE_FORMAT: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request against the service, before credentials are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/geocode`.
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
    /// JSON array body for batch lookups.
    pub body: Option<Vec<String>>,
}

impl Request {
    pub fn get(path: &'static str, params: Vec<(&'static str, String)>) -> Self {
        Self { method: Method::Get, path, params, body: None }
    }

    pub fn post(
        path: &'static str,
        body: Vec<String>,
        params: Vec<(&'static str, String)>,
    ) -> Self {
        Self { method: Method::Post, path, params, body: Some(body) }
    }
}

/// Performs one HTTP exchange and hands back the raw response body.
///
/// Implementations attach the API key and response format themselves and
/// map network or status failures to [`GeocodioError::TransportFailure`].
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &Request) -> Result<String, GeocodioError>;
}

/// Decodes a response body into the target shape.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, GeocodioError> {
    serde_json::from_str(body).map_err(GeocodioError::from)
}

/// The reqwest-backed transport used by default.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api_key: String,
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(api_key: String) -> Result<Self, GeocodioError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: String) -> HttpTransportBuilder {
        HttpTransportBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl HttpTransportBuilder {
    /// Points the transport at another host, e.g. a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpTransport, GeocodioError> {
        let api_key = self.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(GeocodioError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GeocodioError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpTransport { api_key, base_url: self.base_url, http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<String, GeocodioError> {
        let url = self.url(request.path);

        debug!(
            method = ?request.method,
            path = request.path,
            params = ?request.params.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            batch_size = request.body.as_ref().map(Vec::len),
            "Sending request to Geocodio"
        );

        let builder = match (&request.method, &request.body) {
            (Method::Get, _) => self.http.get(&url),
            (Method::Post, Some(body)) => self.http.post(&url).json(body),
            (Method::Post, None) => self.http.post(&url),
        };

        let res = builder
            .query(&[("api_key", self.api_key.as_str()), ("format", RESPONSE_FORMAT)])
            .query(&request.params)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key; keep it out of the message.
                let e = e.without_url();
                GeocodioError::transport(format!("Failed to send request to {}: {e}", request.path))
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| {
                let e = e.without_url();
                GeocodioError::transport(format!("Failed to read response body: {e}"))
            })?;

        if !status.is_success() {
            warn!(%status, path = request.path, "Geocodio request failed");
            return Err(GeocodioError::TransportFailure {
                status: Some(status),
                message: error_message(&body),
            });
        }

        debug!(%status, bytes = body.len(), "Received Geocodio response");
        Ok(body)
    }
}

/// Pulls the `error` member out of an error body, else a truncated body.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
