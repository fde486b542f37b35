use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::FromRef;

use recipebook_access::{FavoritesService, RecipeService};
use recipebook_state::{FavoritesState, RecipeState};
use recipebook_store::{BlobStore, DocumentStore};

use crate::auth::AuthProvider;

/// Shared handles behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeState>,
    pub favorites: FavoritesService,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub max_image_bytes: usize,
    favorite_caches: Arc<Mutex<HashMap<String, Arc<FavoritesState>>>>,
}

impl AppState {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        auth: Arc<dyn AuthProvider>,
        max_image_bytes: usize,
    ) -> Self {
        let recipe_service = RecipeService::new(documents.clone(), blobs.clone());
        let favorites = FavoritesService::new(documents, recipe_service.clone());
        Self {
            recipes: Arc::new(RecipeState::new(recipe_service)),
            favorites,
            blobs,
            auth,
            max_image_bytes,
            favorite_caches: Arc::default(),
        }
    }

    pub fn recipe_service(&self) -> &RecipeService {
        self.recipes.service()
    }

    /// The favorites cache of `account_id`, created on first use.
    pub fn favorites_for(&self, account_id: &str) -> Arc<FavoritesState> {
        let mut caches = self
            .favorite_caches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        caches
            .entry(account_id.to_string())
            .or_insert_with(|| {
                Arc::new(FavoritesState::new(self.favorites.clone(), account_id))
            })
            .clone()
    }

    /// Every favorites cache created so far, by account.
    pub fn favorite_caches(&self) -> Vec<(String, Arc<FavoritesState>)> {
        let caches = self
            .favorite_caches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = caches
            .iter()
            .map(|(account, cache)| (account.clone(), cache.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl FromRef<AppState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("max_image_bytes", &self.max_image_bytes)
            .finish_non_exhaustive()
    }
}
