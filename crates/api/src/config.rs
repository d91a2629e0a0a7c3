//! Endpoint configuration read from the process environment.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use url::Url;

/// Environment variable holding the inference endpoint URL.
pub const ENDPOINT_ENV: &str = "HUDL_ENDPOINT";
/// Environment variable holding the API key sent as `x-api-key`.
pub const API_KEY_ENV: &str = "HUDL_API_KEY";
/// Environment variable overriding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "HUDL_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Where and how to reach the inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl EndpointConfig {
    /// Build a configuration from explicit values, validating the endpoint URL.
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let endpoint = validate_endpoint_url(endpoint)?;
        Ok(Self {
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `HUDL_ENDPOINT`, `HUDL_API_KEY`, and `HUDL_TIMEOUT_SECS`.
    ///
    /// Explicit overrides (for example from command-line flags) take
    /// precedence over the environment.
    pub fn from_env_with_overrides(endpoint: Option<String>, api_key: Option<String>) -> Result<Self> {
        let endpoint = endpoint
            .or_else(|| env::var(ENDPOINT_ENV).ok())
            .ok_or_else(|| anyhow!("{ENDPOINT_ENV} is not set. Hint: export {ENDPOINT_ENV}=https://<your-endpoint>"))?;
        let api_key = api_key.or_else(|| env::var(API_KEY_ENV).ok());

        let mut config = Self::new(&endpoint, api_key)?;
        if let Ok(raw_timeout) = env::var(TIMEOUT_ENV) {
            let seconds: u64 = raw_timeout
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds; got '{raw_timeout}'"))?;
            config.timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }

    /// Read the configuration from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_overrides(None, None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Validate that an endpoint URL is acceptable for use by the client.
///
/// Rules:
/// - the URL must parse and include a host
/// - `localhost` and loopback addresses may use any scheme
/// - every other host must use HTTPS, since the API key travels in a header
pub fn validate_endpoint_url(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw.trim()).map_err(|e| anyhow!("Invalid {ENDPOINT_ENV} URL '{}': {}", raw, e))?;

    let host_name = parsed
        .host_str()
        .ok_or_else(|| anyhow!("{ENDPOINT_ENV} must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "{ENDPOINT_ENV} must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        ));
    }

    Ok(parsed)
}
