use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use recipebook_access::FavoritesService;
use recipebook_types::Favorite;

use crate::error::StateResult;
use crate::status::{Operation, RequestTracker};

/// Cached favorite recipe ids for one account, fixed at construction.
#[derive(Debug)]
pub struct FavoritesState {
    service: FavoritesService,
    owner_id: String,
    ids: RwLock<Vec<String>>,
    tracker: RequestTracker,
}

impl FavoritesState {
    pub fn new(service: FavoritesService, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
            ids: RwLock::new(Vec::new()),
            tracker: RequestTracker::new(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn service(&self) -> &FavoritesService {
        &self.service
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub fn favorites(&self) -> Vec<String> {
        self.read().clone()
    }

    /// Cache lookup only.
    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.read().iter().any(|id| id == recipe_id)
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.tracker.last_error()
    }

    pub async fn fetch_user_favorites(&self) -> StateResult<Vec<String>> {
        let request = self.tracker.begin(Operation::FetchFavorites);
        let result = self.service.get_user_favorites(&self.owner_id).await;
        if let Ok(ids) = &result {
            *self.write() = ids.clone();
            debug!(request = %request.id(), owner_id = %self.owner_id, count = ids.len(), "favorites cache replaced");
        }
        request.settle(result)
    }

    pub async fn add_to_favorites(&self, recipe_id: &str) -> StateResult<Favorite> {
        let request = self.tracker.begin(Operation::AddFavorite);
        let result = self.service.add_to_favorites(&self.owner_id, recipe_id).await;
        if result.is_ok() {
            let mut ids = self.write();
            if !ids.iter().any(|id| id == recipe_id) {
                ids.push(recipe_id.to_string());
            }
        }
        request.settle(result)
    }

    pub async fn remove_from_favorites(&self, recipe_id: &str) -> StateResult<()> {
        let request = self.tracker.begin(Operation::RemoveFavorite);
        let result = self.service.remove_from_favorites(&self.owner_id, recipe_id).await;
        if result.is_ok() {
            self.write().retain(|id| id != recipe_id);
        }
        request.settle(result)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<String>> {
        self.ids.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<String>> {
        self.ids.write().unwrap_or_else(PoisonError::into_inner)
    }
}
