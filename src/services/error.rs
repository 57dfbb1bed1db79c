use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error("database did not report the id of the inserted row")]
    MissingInsertId,
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
