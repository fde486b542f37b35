//! In-memory document and blob stores.
//!
//! Both stores keep their data behind a `RwLock` and lose it when dropped.
//! Each can be switched offline with `set_available(false)`, after which
//! every call fails with [`StoreError::Unavailable`] the way a remote
//! backend does when the network is down.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

use recipebook_types::Fields;

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    validate_blob_path, validate_document_path, BlobStore, Document, DocumentStore,
};

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

/// An in-memory implementation of [`DocumentStore`].
///
/// Documents are kept per collection in id order. Ids are UUID v7, so that
/// order follows insertion time.
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    available: AtomicBool,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection to the backend.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.read()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Returns `true` if `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Remove every document from every collection.
    pub fn clear(&self) -> StoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("document store is offline".into()))
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .read()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &names)
            .field("available", &self.available.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.check_available()?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.check_available()?;
        validate_document_path(collection, id)?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        self.check_available()?;
        let id = Uuid::now_v7().simple().to_string();
        validate_document_path(collection, &id)?;
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.check_available()?;
        validate_document_path(collection, id)?;
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update_merge(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> StoreResult<Document> {
        self.check_available()?;
        validate_document_path(collection, id)?;
        let mut collections = self.write()?;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        Ok(Document::new(id, existing.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.check_available()?;
        validate_document_path(collection, id)?;
        let mut collections = self.write()?;
        Ok(collections
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.check_available()?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Clone, Debug)]
struct StoredBlob {
    data: Bytes,
    content_type: Option<String>,
}

/// An in-memory implementation of [`BlobStore`].
///
/// URLs are `<base_url>/<path>`; the default base is `memory://blobs`.
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, StoredBlob>>,
    available: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url("memory://blobs")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of every stored path.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .blobs
            .read()
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    /// Content type recorded for `path`, if any.
    pub fn content_type(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .ok()
            .and_then(|b| b.get(path).and_then(|blob| blob.content_type.clone()))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("blob store is offline".into()))
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("base_url", &self.base_url)
            .field("blob_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StoreResult<String> {
        self.check_available()?;
        validate_blob_path(path)?;
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        blobs.insert(
            path.to_string(),
            StoredBlob {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(format!("{}/{path}", self.base_url))
    }

    async fn download(&self, path: &str) -> StoreResult<Option<Bytes>> {
        self.check_available()?;
        validate_blob_path(path)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        Ok(blobs.get(path).map(|blob| blob.data.clone()))
    }
}
