//! Request building, response parsing, and the async request client.
//!
//! # Design
//! `TabasClient` holds only a `base_url` and carries no mutable state
//! between calls. `build_request` produces an `HttpRequest`;
//! `parse_response` consumes an `HttpResponse`. Neither touches the network.
//! `RequestClient` pairs it with a `Transport` to give the one-call
//! `request<T>(path, options)` the resource accessors use. Every call is a
//! single attempt: no retry, no backoff.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestOptions};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::ErrorBody;

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct TabasClient {
    base_url: String,
}

impl TabasClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `path` to the base URL. A JSON body gets its content type.
    pub fn build_request(&self, path: &str, options: &RequestOptions) -> HttpRequest {
        let mut headers = Vec::with_capacity(options.headers.len() + 1);
        if options.body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.extend(options.headers.iter().cloned());
        HttpRequest {
            method: options.method,
            url: format!("{}{path}", self.base_url),
            headers,
            body: options.body.clone(),
        }
    }

    /// Any 2xx is success and its body is decoded as `T`; other statuses map
    /// to `ApiError` variants.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = || {
        serde_json::from_str::<ErrorBody>(&response.body)
            .map(|body| body.message)
            .unwrap_or_else(|_| response.body.clone())
    };
    Err(match response.status {
        400 => ApiError::Validation { message: message() },
        404 => ApiError::NotFound { message: message() },
        status => ApiError::UnexpectedStatus {
            status,
            body: response.body.clone(),
        },
    })
}

/// Async typed request client: build, execute once, parse.
#[derive(Clone)]
pub struct RequestClient {
    builder: TabasClient,
    transport: Arc<dyn Transport>,
}

impl RequestClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            builder: TabasClient::new(base_url),
            transport,
        }
    }

    /// Client over reqwest, configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(&config.base_url, Arc::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        self.builder.base_url()
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = self.builder.build_request(path, &options);
        let method = request.method.as_str();
        debug!(method, url = %request.url, "sending request");

        let result = match self.transport.execute(request).await {
            Ok(response) => self.builder.parse_response(response),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(method, path, error = %err, "API request failed");
        }
        result
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, RequestOptions::get()).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.request(path, RequestOptions::post().json(body)?).await
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("base_url", &self.builder.base_url)
            .finish_non_exhaustive()
    }
}
