//! Transform configuration
//!
//! This module holds the names the transform reads and writes. The exported
//! `transform` entry point always runs with [`TransformConfig::default`].

use crate::error::ConfigError;

/// Default object holding the request headers
pub const DEFAULT_HEADERS_FIELD: &str = "headers";
/// Default marker header set on every transformed request
pub const DEFAULT_MARKER_HEADER: &str = "x-wasm-transform";
/// Default marker header value
pub const DEFAULT_MARKER_VALUE: &str = "true";
/// Default environment key holding the secret
pub const DEFAULT_SECRET_ENV_KEY: &str = "secret";
/// Default header receiving the secret
pub const DEFAULT_SECRET_HEADER: &str = "x-wasm-secret";

/// Transform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Top-level field holding the header map
    pub headers_field: String,
    /// Header set unconditionally when headers are present
    pub marker_header: String,
    /// Value of the marker header
    pub marker_value: String,
    /// Environment key looked up for the secret
    pub secret_env_key: String,
    /// Header receiving the secret when it is configured
    pub secret_header: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            headers_field: DEFAULT_HEADERS_FIELD.to_string(),
            marker_header: DEFAULT_MARKER_HEADER.to_string(),
            marker_value: DEFAULT_MARKER_VALUE.to_string(),
            secret_env_key: DEFAULT_SECRET_ENV_KEY.to_string(),
            secret_header: DEFAULT_SECRET_HEADER.to_string(),
        }
    }
}

impl TransformConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("headers_field", &self.headers_field),
            ("marker_header", &self.marker_header),
            ("secret_env_key", &self.secret_env_key),
            ("secret_header", &self.secret_header),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        // the secret would silently overwrite the marker
        if self.marker_header == self.secret_header {
            return Err(ConfigError::InvalidValue {
                field: "secret_header".to_string(),
                value: self.secret_header.clone(),
            });
        }

        Ok(())
    }
}

/// Builder for [`TransformConfig`]
#[derive(Debug, Clone, Default)]
pub struct TransformConfigBuilder {
    config: TransformConfig,
}

impl TransformConfigBuilder {
    /// Create a builder seeded with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the headers field
    pub fn headers_field(mut self, field: impl Into<String>) -> Self {
        self.config.headers_field = field.into();
        self
    }

    /// Set the marker header and its value
    pub fn marker(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.marker_header = header.into();
        self.config.marker_value = value.into();
        self
    }

    /// Set the environment key and header used for the secret
    pub fn secret(mut self, env_key: impl Into<String>, header: impl Into<String>) -> Self {
        self.config.secret_env_key = env_key.into();
        self.config.secret_header = header.into();
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<TransformConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
