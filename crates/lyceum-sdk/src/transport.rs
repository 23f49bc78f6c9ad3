//! Request descriptors and the HTTP transport seam
//!
//! Every authenticated call is described by an [`ApiRequest`] so that it can be
//! queued and replayed after a token refresh. The [`Transport`] trait is the only
//! place where bytes hit the network, which keeps the refresh protocol testable
//! without a server.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// A replayable description of an outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Flatten a serializable struct into query parameters
    ///
    /// `None` fields are skipped, so optional filters can be passed as-is.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        match serde_json::to_value(query)? {
            serde_json::Value::Object(fields) => {
                for (key, value) in fields {
                    match value {
                        serde_json::Value::Null => {}
                        serde_json::Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
            }
            serde_json::Value::Null => {}
            other => {
                return Err(ApiError::InvalidRequest {
                    message: format!("query parameters must be an object, got {other}"),
                })
            }
        }
        Ok(self)
    }

    /// Add a single query parameter
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Bearer token currently attached to this request, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

/// Attach (or strip) the bearer credential on a copy of `request`
///
/// Synchronous and side-effect free: the caller's descriptor is never mutated,
/// so the original stays available for replay with a different token.
pub fn attach_credential(request: &ApiRequest, token: Option<&str>) -> Result<ApiRequest> {
    let mut request = request.clone();
    match token {
        Some(token) => {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ApiError::InvalidRequest {
                    message: "access token contains characters not allowed in a header".into(),
                }
            })?;
            request.headers.insert(AUTHORIZATION, value);
        }
        None => {
            request.headers.remove(AUTHORIZATION);
        }
    }
    Ok(request)
}

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    ///
    /// Empty bodies (and 204/205) decode as JSON `null`, so `()` and `Option<T>`
    /// targets work for endpoints that return nothing.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let empty = matches!(
            self.status,
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT
        ) || self.body.iter().all(u8::is_ascii_whitespace);

        if empty {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-success response into the matching [`ApiError`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.text()))
        }
    }
}

/// Sends one request and buffers the response
///
/// Implementations must not interpret status codes: a 401 is a successful
/// `send` with `status == 401`. Only failures where no response exists are
/// returned as errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Connection settings shared by the API and refresh transports
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
    pub pool_max_idle_per_host: Option<usize>,
    pub cookie_jar: Arc<reqwest::cookie::Jar>,
}

impl HttpSettings {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: None,
            pool_max_idle_per_host: None,
            cookie_jar: Arc::new(reqwest::cookie::Jar::default()),
        }
    }

    /// Build a reqwest client carrying these settings
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .cookie_provider(Arc::clone(&self.cookie_jar));

        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(max) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max);
        }

        builder.build().map_err(ApiError::HttpClient)
    }
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, settings: &HttpSettings) -> Result<Self> {
        Ok(Self::with_client(base_url, settings.build_client()?))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        trace!(method = %request.method, %url, "Sending request");

        let mut builder = self
            .http_client
            .request(request.method, &url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(ApiResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::HttpClient(err)
    }
}
