use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("key not found")]
    NotFound,
    #[error("storage I/O error: {0}")]
    Io(String),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}
