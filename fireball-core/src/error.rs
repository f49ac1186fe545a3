use thiserror::Error;

#[derive(Debug, Error)]
pub enum FireballError {
    #[error("network error: {0}")]
    Network(String),

    #[error("catalog is not valid JSON: {0}")]
    Decode(String),

    #[error("invalid coordinate {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: String },

    #[error("no data found for this query")]
    NoMatch,

    #[error("catalog row {row} skipped: {reason}")]
    SchemaViolation { row: usize, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("cannot {action} while {from}")]
    InvalidTransition { from: String, action: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FireballError>;
