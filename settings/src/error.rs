use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Faults reported by a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("A custom provider needs a base URL")]
    EmptyCustomUrl,
    #[error("API key is empty")]
    EmptyApiKey,
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Invalid shared link: {0}")]
    InvalidSharedLink(#[source] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
