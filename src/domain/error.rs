use thiserror::Error;

use crate::domain::models::PlayerId;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Player already exists: {0}")]
    Conflict(String),

    #[error("Player not found: {0}")]
    NotFound(PlayerId),

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Missing header row")]
    MissingHeader,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Error reading upload: {0}")]
    Stream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RosterError {
    /// Status a transport layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RosterError::Validation(_)
            | RosterError::EmptyUpload
            | RosterError::MissingHeader
            | RosterError::MissingColumn(_) => 400,
            RosterError::NotFound(_) => 404,
            RosterError::Conflict(_) => 409,
            RosterError::Stream(_)
            | RosterError::Database(_)
            | RosterError::Config(_)
            | RosterError::Internal(_) => 500,
        }
    }

    /// Errors that abort a whole bulk upload instead of failing a single row.
    pub fn is_stream_level(&self) -> bool {
        matches!(
            self,
            RosterError::EmptyUpload
                | RosterError::MissingHeader
                | RosterError::MissingColumn(_)
                | RosterError::Stream(_)
        )
    }
}

/// Problem confined to a single upload row. Never aborts an upload.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing value for column {0}")]
    MissingValue(&'static str),

    #[error("invalid date of birth '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid height '{value}': {source}")]
    InvalidHeight {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("blank line")]
    BlankLine,

    #[error("unreadable record: {0}")]
    Unreadable(String),
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        RosterError::Stream(err.to_string())
    }
}

impl From<mongodb::error::Error> for RosterError {
    fn from(err: mongodb::error::Error) -> Self {
        RosterError::Database(err.to_string())
    }
}
