use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to retrieve credentials: {0}")]
    Retrieval(String),

    #[error("failed to connect to database: {0}")]
    Connection(String),

    #[error("invalid object id: {0}")]
    Validation(String),

    #[error("database operation failed: {0}")]
    Database(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}
