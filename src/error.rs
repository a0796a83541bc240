use thiserror::Error;

#[derive(Debug, Error)]
pub enum CareTrackError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl From<diesel::result::Error> for CareTrackError {
    fn from(e: diesel::result::Error) -> Self {
        CareTrackError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CareTrackError>;
