use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("no unique short code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
    #[error(transparent)]
    StoreUnavailable(#[from] StorageError),
}

pub type ShortenerResult<T> = Result<T, ShortenerError>;
