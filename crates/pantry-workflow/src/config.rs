use std::time::Duration;

use crate::errors::{Endpoint, WorkflowError};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the HTTP backend client.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Origin serving `/api/upload` and `/api/recipes`.
    pub base_url: String,
    /// Per-request HTTP timeout. Expiry surfaces as a transport error.
    pub timeout: Duration,
    /// Upload body chunk size; progress is reported once per chunk.
    pub upload_chunk_size: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BackendConfig {
    /// Creates a config with default timeout and chunk size.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }

    /// Builds a config from `PANTRY_API_BASE_URL` and the optional
    /// `PANTRY_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, WorkflowError> {
        let base_url = std::env::var("PANTRY_API_BASE_URL").unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(WorkflowError::Config(
                "missing PANTRY_API_BASE_URL for the pantry backend".into(),
            ));
        }
        let mut config = Self::new(base_url.trim());
        if let Ok(raw) = std::env::var("PANTRY_API_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                WorkflowError::Config(format!("invalid PANTRY_API_TIMEOUT_SECS {raw:?}: {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Overrides the base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the upload chunk size.
    pub fn upload_chunk_size(mut self, size: usize) -> Self {
        self.upload_chunk_size = size;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), WorkflowError> {
        if self.base_url.trim().is_empty() {
            return Err(WorkflowError::Config("base_url must not be empty".into()));
        }
        if self.upload_chunk_size == 0 {
            return Err(WorkflowError::Config(
                "upload_chunk_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let config = BackendConfig::new("http://pantry.local:3003/");
        assert_eq!(
            config.endpoint_url(Endpoint::Upload),
            "http://pantry.local:3003/api/upload"
        );
        assert_eq!(
            config.endpoint_url(Endpoint::Recipes),
            "http://pantry.local:3003/api/recipes"
        );
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let err = BackendConfig::default().upload_chunk_size(0).validate();
        assert!(matches!(err, Err(WorkflowError::Config(msg)) if msg.contains("chunk")));
    }

    #[test]
    fn defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }
}
