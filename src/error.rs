//! Error types for the TAK onboarding guide.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value storage errors.
///
/// Never surfaced past `ProgressStore`: reads degrade to empty state and
/// writes are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed value under {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Step catalog validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Platform {platform} has no onboarding steps")]
    EmptyPlatform { platform: String },

    #[error("Platform {platform} defines step {id} more than once")]
    DuplicateStep { platform: String, id: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Installer-artifact fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact downloads are not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server returned status {status}")]
    Status { status: u16 },

    #[error("No package available for platform {platform}")]
    Missing { platform: String },

    #[error("Invalid package payload: {0}")]
    InvalidPayload(String),

    #[error("Ephemeral URL for {title} has expired")]
    Expired { title: String },
}
