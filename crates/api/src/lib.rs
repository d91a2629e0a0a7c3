//! Inference endpoint client.
//!
//! This crate provides a lightweight client for the remote inference service
//! a widget talks to. It focuses on:
//!
//! - Reading and validating the endpoint configuration (`HUDL_ENDPOINT`, `HUDL_API_KEY`)
//! - Constructing an HTTP client with the JSON content negotiation and `x-api-key` headers
//! - The two round-trips of a session: the readiness probe (`GET`) and the prediction (`POST`)
//! - Unwrapping the `{ body: { output } }` service envelope
//!
//! The primary entry point is [`InferenceClient`]; the [`InferenceTransport`]
//! trait is the seam the engine drives.
//!
//! # Example
//!
//! ```ignore
//! use hudl_api::{EndpointConfig, InferenceClient, InferenceTransport};
//!
//! async fn run() -> anyhow::Result<()> {
//!     let client = InferenceClient::new(&EndpointConfig::from_env()?)?;
//!     let output = client.predict(&serde_json::json!("great day")).await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```

use std::env;

use anyhow::{Context, Result};
use async_trait::async_trait;
use hudl_util::http::{parse_response_json_strict, status_error_message};
use hudl_util::{redact_sensitive, truncate_for_summary};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::{Map, Value};
use tracing::debug;

pub mod config;
pub mod transport;

pub use config::{EndpointConfig, validate_endpoint_url};
pub use transport::{InferenceTransport, TransportError, extract_output};

/// Header carrying the endpoint credential.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for one inference endpoint.
///
/// Every request carries `Content-Type: application/json`,
/// `Accept: application/json`, and, when configured, `x-api-key`.
pub struct InferenceClient {
    pub endpoint: Url,
    pub http: Client,
    pub user_agent: String,
    default_headers: HeaderMap,
}

impl InferenceClient {
    /// Construct an [`InferenceClient`] from an endpoint configuration.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let mut api_key_value =
                HeaderValue::from_str(api_key).context("API key contains characters that are not valid in an HTTP header")?;
            api_key_value.set_sensitive(true);
            default_headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key_value);
        }

        let http = Client::builder()
            .default_headers(default_headers.clone())
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http,
            user_agent: format!("hudl/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            default_headers,
        })
    }

    /// Construct an [`InferenceClient`] from `HUDL_ENDPOINT` and `HUDL_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(&EndpointConfig::from_env()?)
    }

    /// Build a `reqwest::RequestBuilder` against the configured endpoint.
    pub fn request(&self, method: Method) -> RequestBuilder {
        debug!(url = %redact_sensitive(self.endpoint.as_str()), %method, "building request");

        self.http
            .request(method, self.endpoint.clone())
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// Describe the prediction request without sending it.
    ///
    /// Header values are redacted so the preview is safe to print.
    pub fn preview_predict(&self, payload: &Value) -> Result<Value> {
        let request = self.request(Method::POST).json(payload).build()?;

        let mut headers_out = Map::new();
        for (name, value) in self.default_headers.iter().chain(request.headers().iter()) {
            let line = format!("{}: {}", name.as_str(), value.to_str().unwrap_or(""));
            let redacted = redact_sensitive(&line);
            let out_val = redacted.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("").to_string();
            headers_out.insert(name.as_str().to_string(), Value::String(out_val));
        }

        Ok(serde_json::json!({
            "method": request.method().as_str(),
            "url": redact_sensitive(request.url().as_str()),
            "headers": headers_out,
            "body": payload,
        }))
    }

    async fn send_for_json(&self, builder: RequestBuilder) -> Result<Value, TransportError> {
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(redact_sensitive(&e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = status_error_message(status.as_u16())
                .unwrap_or_else(|| truncate_for_summary(&redact_sensitive(&text), 160));
            return Err(TransportError::status(status.as_u16(), message));
        }

        parse_response_json_strict(&text, Some(status)).map_err(|e| TransportError::decode(e.to_string()))
    }
}

#[async_trait]
impl InferenceTransport for InferenceClient {
    async fn probe(&self) -> Result<Value, TransportError> {
        self.send_for_json(self.request(Method::GET)).await
    }

    async fn predict(&self, payload: &Value) -> Result<Value, TransportError> {
        let envelope = self.send_for_json(self.request(Method::POST).json(payload)).await?;
        extract_output(envelope)
    }
}
