use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use recipebook_store::DocumentStore;
use recipebook_types::{Favorite, Recipe};

use crate::error::{AccessError, AccessResult};
use crate::recipes::RecipeService;

/// Collection holding favorite join records.
pub const FAVORITES_COLLECTION: &str = "favorites";

/// Favorites keyed by `<ownerId>_<recipeId>`.
#[derive(Clone)]
pub struct FavoritesService {
    documents: Arc<dyn DocumentStore>,
    recipes: RecipeService,
}

impl FavoritesService {
    pub fn new(documents: Arc<dyn DocumentStore>, recipes: RecipeService) -> Self {
        Self { documents, recipes }
    }

    /// Mark `recipe_id` as a favorite of `owner_id`. Repeating the call
    /// rewrites the same record.
    pub async fn add_to_favorites(&self, owner_id: &str, recipe_id: &str) -> AccessResult<Favorite> {
        let favorite = Favorite::new(owner_id, recipe_id);
        self.documents
            .set(
                FAVORITES_COLLECTION,
                &favorite.document_key(),
                favorite.to_document()?,
            )
            .await?;
        debug!(owner_id, recipe_id, "added favorite");
        Ok(favorite)
    }

    /// Removing a favorite that does not exist is not an error.
    pub async fn remove_from_favorites(&self, owner_id: &str, recipe_id: &str) -> AccessResult<()> {
        let key = Favorite::key(owner_id, recipe_id);
        let existed = self.documents.delete(FAVORITES_COLLECTION, &key).await?;
        debug!(owner_id, recipe_id, existed, "removed favorite");
        Ok(())
    }

    /// Recipe ids favored by `owner_id`.
    pub async fn get_user_favorites(&self, owner_id: &str) -> AccessResult<Vec<String>> {
        let docs = self
            .documents
            .query_eq(
                FAVORITES_COLLECTION,
                "ownerId",
                &Value::String(owner_id.to_string()),
            )
            .await?;
        docs.into_iter()
            .map(|doc| {
                Favorite::from_document(doc.fields)
                    .map(|fav| fav.recipe_id)
                    .map_err(|e| AccessError::MalformedDocument {
                        id: doc.id,
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    pub async fn is_favorite(&self, owner_id: &str, recipe_id: &str) -> AccessResult<bool> {
        let key = Favorite::key(owner_id, recipe_id);
        Ok(self.documents.get(FAVORITES_COLLECTION, &key).await?.is_some())
    }

    /// The favored recipes themselves. Favorites whose recipe has been
    /// deleted are skipped.
    pub async fn favorite_recipes(&self, owner_id: &str) -> AccessResult<Vec<Recipe>> {
        let ids = self.get_user_favorites(owner_id).await?;
        let mut recipes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.recipes.get_by_id(&id).await {
                Ok(recipe) => recipes.push(recipe),
                Err(AccessError::RecipeNotFound(_)) => {
                    debug!(owner_id, recipe_id = %id, "skipping dangling favorite");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(recipes)
    }
}

impl std::fmt::Debug for FavoritesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesService").finish_non_exhaustive()
    }
}
