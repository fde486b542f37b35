use recipebook_store::StoreError;
use recipebook_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    /// No recipe document exists at this id.
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),

    /// A stored document could not be decoded into its record type.
    #[error("malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// A record could not be encoded for the store.
    #[error("encoding error: {0}")]
    Encoding(#[from] TypeError),

    /// Transport or backend failure, passed through untouched.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AccessError {
    /// Returns `true` for the domain not-found case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecipeNotFound(_))
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
