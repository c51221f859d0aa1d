use thiserror::Error;

/// Errors raised while reading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Could not determine a data directory for the database")]
    NoDataDir,
}

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Database query error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Migration error: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync>),
    #[error("Schema mismatch in table `{table}`: {detail}")]
    SchemaMismatch { table: String, detail: String },
    #[error("Topic {0} not found")]
    TopicNotFound(i32),
    #[error("Task {0} not found")]
    TaskNotFound(i32),
    #[error("Topic `{0}` is protected")]
    ProtectedTopic(String),
    #[error("Invalid name: {0:?}")]
    InvalidName(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type StoreResult<T> = Result<T, StoreError>;
