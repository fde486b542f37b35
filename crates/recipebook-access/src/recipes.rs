use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use recipebook_store::{BlobStore, Document, DocumentStore, StoreError};
use recipebook_types::{ImageUpload, Recipe, RecipeDraft, RecipePatch, TypeError};

use crate::error::{AccessError, AccessResult};

/// Collection holding recipe documents.
pub const RECIPES_COLLECTION: &str = "recipes";

/// Domain operations on recipes, expressed as document and blob store calls.
#[derive(Clone)]
pub struct RecipeService {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl RecipeService {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { documents, blobs }
    }

    /// Every recipe in the collection, in store order. An empty collection
    /// is a valid result.
    pub async fn list_all(&self) -> AccessResult<Vec<Recipe>> {
        let docs = self.documents.get_all(RECIPES_COLLECTION).await?;
        debug!(count = docs.len(), "listed recipes");
        docs.into_iter().map(decode).collect()
    }

    /// Fails with [`AccessError::RecipeNotFound`] when nothing exists at `id`.
    pub async fn get_by_id(&self, id: &str) -> AccessResult<Recipe> {
        if !is_addressable(id) {
            return Err(AccessError::RecipeNotFound(id.to_string()));
        }
        match self.documents.get(RECIPES_COLLECTION, id).await? {
            Some(doc) => decode(doc),
            None => Err(AccessError::RecipeNotFound(id.to_string())),
        }
    }

    /// Insert a new recipe. `createdAt` and `updatedAt` are both set to now.
    pub async fn create(&self, draft: RecipeDraft) -> AccessResult<Recipe> {
        let now = Utc::now();
        let fields = draft.to_document(now)?;
        let id = self.documents.add(RECIPES_COLLECTION, fields).await?;
        debug!(%id, "created recipe");
        Ok(draft.into_recipe(id, now))
    }

    /// Merge `patch` into the stored recipe and refresh `updatedAt`.
    ///
    /// When `image` is supplied it is uploaded first and its URL replaces
    /// `patch.image_url`. Earlier blobs are never deleted, and a blob
    /// uploaded for an update whose merge then fails is left in place.
    pub async fn update(
        &self,
        id: &str,
        patch: RecipePatch,
        image: Option<ImageUpload>,
    ) -> AccessResult<Recipe> {
        if !is_addressable(id) {
            return Err(AccessError::RecipeNotFound(id.to_string()));
        }
        let mut patch = patch;
        let mut uploaded = None;
        if let Some(image) = image {
            let path = image.blob_path(Utc::now());
            let url = self
                .blobs
                .upload(&path, image.data, image.content_type.as_deref())
                .await?;
            debug!(%id, %path, %url, "uploaded recipe image");
            patch.image_url = Some(url);
            uploaded = Some(path);
        }

        let mut fields = patch.to_fields()?;
        let stamp = serde_json::to_value(Utc::now()).map_err(TypeError::from)?;
        fields.insert("updatedAt".into(), stamp);

        let merged = match self
            .documents
            .update_merge(RECIPES_COLLECTION, id, fields)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                if let Some(path) = &uploaded {
                    warn!(%id, %path, error = %e, "recipe update failed after image upload; blob left in place");
                }
                return Err(match e {
                    StoreError::DocumentNotFound { .. } => {
                        AccessError::RecipeNotFound(id.to_string())
                    }
                    other => other.into(),
                });
            }
        };
        debug!(%id, "updated recipe");
        decode(merged)
    }

    /// Remove the recipe document. Favorites pointing at it are left as
    /// dangling references.
    pub async fn delete(&self, id: &str) -> AccessResult<()> {
        if !is_addressable(id) {
            debug!(%id, "delete of unaddressable recipe id ignored");
            return Ok(());
        }
        let existed = self.documents.delete(RECIPES_COLLECTION, id).await?;
        debug!(%id, existed, "deleted recipe");
        Ok(())
    }

    /// Every recipe whose `ownerId` equals `owner_id`.
    pub async fn list_by_owner(&self, owner_id: &str) -> AccessResult<Vec<Recipe>> {
        let docs = self
            .documents
            .query_eq(
                RECIPES_COLLECTION,
                "ownerId",
                &Value::String(owner_id.to_string()),
            )
            .await?;
        docs.into_iter().map(decode).collect()
    }
}

impl std::fmt::Debug for RecipeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeService").finish_non_exhaustive()
    }
}

/// Store-assigned ids are never empty and never contain `/`, so no recipe
/// can live at such an id.
fn is_addressable(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

fn decode(doc: Document) -> AccessResult<Recipe> {
    let Document { id, fields } = doc;
    Recipe::from_document(&id, fields).map_err(|e| AccessError::MalformedDocument {
        id,
        reason: e.to_string(),
    })
}
