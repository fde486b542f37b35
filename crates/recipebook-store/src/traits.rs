use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use recipebook_types::Fields;

use crate::error::{StoreError, StoreResult};

/// A document as returned by the store: its id plus its field map.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Remote schemaless document database.
///
/// All implementations must satisfy these invariants:
/// - Ids returned by `add` are unique within the collection and never reused.
/// - `update_merge` overwrites only the supplied top-level fields and fails
///   with [`StoreError::DocumentNotFound`] when the document is absent.
/// - Backend failures surface as errors; nothing is swallowed or retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`. Order is backend-defined.
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Read a document by id.
    ///
    /// Returns `Ok(None)` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Insert a document and return its freshly assigned id.
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Create or fully replace the document at a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Merge `fields` into an existing document and return the merged view.
    async fn update_merge(&self, collection: &str, id: &str, fields: Fields)
        -> StoreResult<Document>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Every document whose `field` equals `value`.
    async fn query_eq(&self, collection: &str, field: &str, value: &Value)
        -> StoreResult<Vec<Document>>;
}

/// Remote object storage for binary assets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path` and return a durable public URL for it.
    ///
    /// Writing to an existing path replaces the content.
    async fn upload(&self, path: &str, data: Bytes, content_type: Option<&str>)
        -> StoreResult<String>;

    /// Read a blob back. Returns `Ok(None)` if nothing is stored at `path`.
    async fn download(&self, path: &str) -> StoreResult<Option<Bytes>>;
}

/// Blob paths are relative, `/`-separated, and free of empty, `.` and `..`
/// segments.
pub fn validate_blob_path(path: &str) -> StoreResult<()> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_document_path(collection: &str, id: &str) -> StoreResult<()> {
    if collection.is_empty() || collection.contains('/') {
        return Err(StoreError::InvalidPath(format!("collection {collection:?}")));
    }
    if id.is_empty() || id.contains('/') {
        return Err(StoreError::InvalidPath(format!("{collection}/{id:?}")));
    }
    Ok(())
}
