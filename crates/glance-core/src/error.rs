//! Error types for Glance

use thiserror::Error;

/// The main error type for Glance operations
#[derive(Debug, Error)]
pub enum GlanceError {
    #[error("Failed to fetch root file {url}: {reason}")]
    RootFetch { url: String, reason: String },

    #[error("Failed to resolve resource '{uri}': {reason}")]
    ResourceResolution { uri: String, reason: String },

    #[error("Validator failed: {0}")]
    ValidatorInvocation(String),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Bundle error: {0}")]
    BundleError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Result type alias for Glance operations
pub type Result<T> = std::result::Result<T, GlanceError>;

impl From<toml::de::Error> for GlanceError {
    fn from(err: toml::de::Error) -> Self {
        GlanceError::TomlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for GlanceError {
    fn from(err: serde_json::Error) -> Self {
        GlanceError::JsonError(err.to_string())
    }
}
