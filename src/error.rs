use reqwest::StatusCode;

/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    /// The operation was superseded. Callers treat this as neither success nor failure.
    #[error("Request cancelled")]
    Cancelled,

    /// Another mutation on the same watchlist key is still pending
    #[error("Operation already in flight for {0}")]
    AlreadyInFlight(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }

    pub fn is_already_in_flight(&self) -> bool {
        matches!(self, AppError::AlreadyInFlight(_))
    }

    /// Status code for `HttpStatus` failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::HttpStatus { status, .. } => Some(*status),
            AppError::Network(e) => e.status(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
