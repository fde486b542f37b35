use recipebook_access::AccessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("meal not found: {0}")]
    MealNotFound(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("access error: {0}")]
    Access(#[from] AccessError),
}

pub type ImportResult<T> = Result<T, ImportError>;
