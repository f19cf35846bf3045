use thiserror::Error;

pub type InsightsResult<T> = Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    /// The store file could not be opened. Fatal for the dashboard.
    #[error("Store connection error ({path}): {message}")]
    StoreConnection { path: String, message: String },

    /// An ad-hoc query the store refused. Carries the store's own message.
    #[error("SQL error: {0}")]
    MalformedQuery(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl InsightsError {
    /// Whether the dashboard session can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedQuery(_))
    }
}
