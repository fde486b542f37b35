use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use recipebook_access::RecipeService;
use recipebook_types::{ImageUpload, Recipe, RecipeDraft, RecipePatch};

use crate::error::StateResult;
use crate::status::{Operation, RequestTracker};

/// The recipe collection as the presentation layer currently knows it.
///
/// Every mutation goes through the [`RecipeService`] first and patches the
/// cache only once the remote call succeeds. A failed call leaves the cache
/// exactly as it was.
#[derive(Debug)]
pub struct RecipeState {
    service: RecipeService,
    recipes: RwLock<Vec<Recipe>>,
    tracker: RequestTracker,
}

impl RecipeState {
    pub fn new(service: RecipeService) -> Self {
        Self {
            service,
            recipes: RwLock::new(Vec::new()),
            tracker: RequestTracker::new(),
        }
    }

    pub fn service(&self) -> &RecipeService {
        &self.service
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// A copy of the cached collection.
    pub fn recipes(&self) -> Vec<Recipe> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Cache lookup only; never touches the store.
    pub fn get_by_id(&self, id: &str) -> Option<Recipe> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.tracker.last_error()
    }

    /// Replace the cache with the full remote collection.
    pub async fn fetch_all(&self) -> StateResult<Vec<Recipe>> {
        let request = self.tracker.begin(Operation::FetchAll);
        let result = self.service.list_all().await;
        if let Ok(recipes) = &result {
            *self.write() = recipes.clone();
            debug!(request = %request.id(), count = recipes.len(), "recipe cache replaced");
        }
        request.settle(result)
    }

    /// Create a recipe and append it to the cache.
    pub async fn add(&self, draft: RecipeDraft) -> StateResult<Recipe> {
        let request = self.tracker.begin(Operation::Add);
        let result = self.service.create(draft).await;
        if let Ok(recipe) = &result {
            self.write().push(recipe.clone());
            debug!(request = %request.id(), id = %recipe.id, "recipe appended to cache");
        }
        request.settle(result)
    }

    pub async fn update(&self, id: &str, patch: RecipePatch) -> StateResult<Recipe> {
        self.update_with_image(id, patch, None).await
    }

    /// Update a recipe, optionally uploading a new image first, and replace
    /// the cached entry in place. An id missing from the cache leaves the
    /// cache unchanged.
    pub async fn update_with_image(
        &self,
        id: &str,
        patch: RecipePatch,
        image: Option<ImageUpload>,
    ) -> StateResult<Recipe> {
        let request = self.tracker.begin(Operation::Update);
        let result = self.service.update(id, patch, image).await;
        if let Ok(updated) = &result {
            let mut recipes = self.write();
            match recipes.iter_mut().find(|r| r.id == id) {
                Some(slot) => *slot = updated.clone(),
                None => debug!(request = %request.id(), %id, "updated recipe not cached"),
            }
        }
        request.settle(result)
    }

    /// Delete a recipe and drop it from the cache.
    pub async fn remove(&self, id: &str) -> StateResult<()> {
        let request = self.tracker.begin(Operation::Remove);
        let result = self.service.delete(id).await;
        if result.is_ok() {
            self.write().retain(|r| r.id != id);
        }
        request.settle(result)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Recipe>> {
        self.recipes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Recipe>> {
        self.recipes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use recipebook_store::{
        Document, DocumentStore, InMemoryBlobStore, InMemoryDocumentStore, StoreResult,
    };
    use recipebook_types::{Difficulty, Fields};
    use serde_json::Value;

    use super::*;
    use crate::status::RequestStatus;

    fn state() -> (Arc<InMemoryDocumentStore>, Arc<InMemoryBlobStore>, RecipeState) {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let service = RecipeService::new(documents.clone(), blobs.clone());
        (documents, blobs, RecipeState::new(service))
    }

    fn tarator() -> RecipeDraft {
        RecipeDraft {
            description: "Cold cucumber and yogurt soup".into(),
            ingredients: "500 g yogurt\n1 cucumber\n2 cloves garlic".into(),
            instructions: "Dice, stir, chill.".into(),
            cooking_time: 20,
            difficulty: Difficulty::Easy,
            servings: 4,
            ..RecipeDraft::new("Tarator", "u1")
        }
    }

    #[tokio::test]
    async fn tarator_lifecycle() {
        let (_, _, state) = state();
        let created = state.add(tarator()).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.cooking_time, 20);
        assert_eq!(state.len(), 1);

        let all = state.fetch_all().await.unwrap();
        assert!(all.iter().any(|r| r.id == created.id));

        state.remove(&created.id).await.unwrap();
        let all = state.fetch_all().await.unwrap();
        assert!(all.iter().all(|r| r.id != created.id));
        assert!(state.is_empty());
        assert!(!state.is_loading());
        assert!(state.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_known_good_cache() {
        let (documents, _, state) = state();
        state.add(tarator()).await.unwrap();
        state.fetch_all().await.unwrap();

        documents.set_available(false);
        let err = state.fetch_all().await.unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(state.len(), 1);
        let message = state.last_error().unwrap();
        assert!(message.starts_with("failed to load recipes"), "{message}");
        assert!(matches!(
            state.tracker().status(err.request),
            Some(RequestStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn repeated_fetches_keep_tracker_bounded() {
        let (_, _, state) = state();
        state.add(tarator()).await.unwrap();
        for _ in 0..2_000 {
            state.fetch_all().await.unwrap();
        }
        assert_eq!(state.tracker().len(), crate::DEFAULT_SETTLED_CAPACITY);
        assert!(!state.is_loading());
        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn failed_add_leaves_cache_untouched() {
        let (documents, _, state) = state();
        documents.set_available(false);
        assert!(state.add(tarator()).await.is_err());
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_entry_in_place() {
        let (_, _, state) = state();
        let first = state.add(tarator()).await.unwrap();
        let second = state.add(RecipeDraft::new("Banitsa", "u1")).await.unwrap();
        let third = state.add(RecipeDraft::new("Shopska", "u1")).await.unwrap();

        let patch = RecipePatch {
            title: Some("Banitsa with spinach".into()),
            servings: Some(8),
            ..Default::default()
        };
        let updated = state.update(&second.id, patch).await.unwrap();
        assert_eq!(updated.title, "Banitsa with spinach");
        assert!(updated.updated_at >= second.updated_at);

        let ids: Vec<String> = state.recipes().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id.clone(), third.id]);
        assert_eq!(state.get_by_id(&second.id).unwrap().servings, 8);
    }

    #[tokio::test]
    async fn update_of_uncached_recipe_leaves_cache_unchanged() {
        let (_, _, state) = state();
        let created = state.service().create(tarator()).await.unwrap();
        let cached = state.add(RecipeDraft::new("Banitsa", "u1")).await.unwrap();

        let patch = RecipePatch {
            cooking_time: Some(25),
            ..Default::default()
        };
        let updated = state.update(&created.id, patch).await.unwrap();
        assert_eq!(updated.cooking_time, 25);
        assert_eq!(state.recipes(), vec![cached]);
    }

    #[tokio::test]
    async fn update_of_missing_recipe_is_not_found() {
        let (_, _, state) = state();
        let err = state
            .update("missing", RecipePatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(state.last_error().unwrap().starts_with("failed to update recipe"));
    }

    #[tokio::test]
    async fn update_with_image_stores_blob_url() {
        let (_, blobs, state) = state();
        let created = state.add(tarator()).await.unwrap();
        let image = ImageUpload::new("photos/tarator.jpg", &b"jpeg"[..]).with_content_type("image/jpeg");

        let updated = state
            .update_with_image(&created.id, RecipePatch::default(), Some(image))
            .await
            .unwrap();
        let url = updated.image_url.unwrap();
        assert!(url.starts_with("memory://blobs/recipe-images/"), "{url}");
        assert!(url.ends_with("-tarator.jpg"), "{url}");
        assert_eq!(blobs.len(), 1);
        assert_eq!(
            state.get_by_id(&created.id).unwrap().image_url.as_deref(),
            Some(url.as_str())
        );
    }

    #[tokio::test]
    async fn remove_of_uncached_id_is_a_noop_on_cache() {
        let (_, _, state) = state();
        let kept = state.add(tarator()).await.unwrap();
        state.remove("never-existed").await.unwrap();
        assert_eq!(state.recipes(), vec![kept]);
    }

    #[tokio::test]
    async fn get_by_id_reads_only_the_cache() {
        let (_, _, state) = state();
        let stored = state.service().create(tarator()).await.unwrap();
        assert!(state.get_by_id(&stored.id).is_none());
        state.fetch_all().await.unwrap();
        assert!(state.get_by_id(&stored.id).is_some());
    }

    #[tokio::test]
    async fn overlapping_adds_each_settle() {
        let (_, _, state) = state();
        let (a, b) = tokio::join!(
            state.add(tarator()),
            state.add(RecipeDraft::new("Banitsa", "u2"))
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);
        assert_eq!(state.len(), 2);

        let records = state.tracker().snapshot();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == RequestStatus::Succeeded));
    }

    /// A document store whose reads never complete.
    #[derive(Debug)]
    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        async fn get_all(&self, _collection: &str) -> StoreResult<Vec<Document>> {
            std::future::pending().await
        }

        async fn get(&self, _collection: &str, _id: &str) -> StoreResult<Option<Document>> {
            std::future::pending().await
        }

        async fn add(&self, _collection: &str, _fields: Fields) -> StoreResult<String> {
            std::future::pending().await
        }

        async fn set(&self, _collection: &str, _id: &str, _fields: Fields) -> StoreResult<()> {
            std::future::pending().await
        }

        async fn update_merge(
            &self,
            _collection: &str,
            _id: &str,
            _fields: Fields,
        ) -> StoreResult<Document> {
            std::future::pending().await
        }

        async fn delete(&self, _collection: &str, _id: &str) -> StoreResult<bool> {
            std::future::pending().await
        }

        async fn query_eq(
            &self,
            _collection: &str,
            _field: &str,
            _value: &Value,
        ) -> StoreResult<Vec<Document>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn dropped_fetch_is_cancelled() {
        let service = RecipeService::new(Arc::new(StalledStore), Arc::new(InMemoryBlobStore::new()));
        let state = RecipeState::new(service);

        let outcome = tokio::time::timeout(Duration::from_millis(20), state.fetch_all()).await;
        assert!(outcome.is_err());

        let records = state.tracker().snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequestStatus::Cancelled);
        assert!(!state.is_loading());
        assert!(state.last_error().is_none());
    }
}
