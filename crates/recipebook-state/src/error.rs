use recipebook_access::AccessError;
use thiserror::Error;

use crate::status::RequestId;

/// A failed state-store operation, tagged with the request it settled.
#[derive(Debug, Error)]
#[error("request {request} failed: {source}")]
pub struct StateError {
    pub request: RequestId,
    pub source: AccessError,
}

impl StateError {
    pub fn is_not_found(&self) -> bool {
        self.source.is_not_found()
    }
}

pub type StateResult<T> = Result<T, StateError>;
