use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache connection lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid upload time {value:?} for version {version}: {source}")]
    InvalidTimestamp {
        version: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
