use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DayKeyError {
    #[error("malformed day key: {0:?}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    MalformedKey(#[from] DayKeyError),

    #[error("failed to decode entries: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("failed to encode entries: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("failed to read entries: {0}")]
    PersistenceRead(#[source] std::io::Error),

    #[error("failed to write entries: {0}")]
    PersistenceWrite(#[source] std::io::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedKey(err) => Self::bad_request(err.to_string()),
            other => Self::internal(other),
        }
    }
}

impl From<DayKeyError> for AppError {
    fn from(err: DayKeyError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
