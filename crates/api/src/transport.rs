//! Transport seam between the widget session and the inference service.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failures of a single probe or predict round-trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Response envelope is missing body.output")]
    MissingOutput,
}

impl TransportError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create an HTTP status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }
}

/// Round-trips against an inference endpoint.
///
/// Implemented by [`crate::InferenceClient`] over HTTP; tests and alternate
/// front-ends can supply their own.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Best-effort readiness call. The decoded body is returned for logging only.
    async fn probe(&self) -> Result<Value, TransportError>;

    /// Send a payload and return the service envelope's `body.output`.
    async fn predict(&self, payload: &Value) -> Result<Value, TransportError>;
}

/// Extract `body.output` from a decoded service envelope.
///
/// An explicit `null` output is returned as-is; only a missing `body` or
/// `output` field is an error.
pub fn extract_output(envelope: Value) -> Result<Value, TransportError> {
    let Value::Object(mut root) = envelope else {
        return Err(TransportError::MissingOutput);
    };
    let Some(Value::Object(mut body)) = root.remove("body") else {
        return Err(TransportError::MissingOutput);
    };
    body.remove("output").ok_or(TransportError::MissingOutput)
}
