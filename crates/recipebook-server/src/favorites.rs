use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use recipebook_types::{Favorite, Recipe};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::recipes::lookup;

/// Recipe ids the caller has favored.
pub async fn list_favorites(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let ids = app.favorites_for(&identity.account_id).fetch_user_favorites().await?;
    Ok(Json(ids))
}

/// The favored recipes themselves. Favorites of deleted recipes are skipped.
pub async fn favorite_recipes(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(app.favorites.favorite_recipes(&identity.account_id).await?))
}

pub async fn add_favorite(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(recipe_id): Path<String>,
) -> Result<Json<Favorite>, ApiError> {
    lookup(&app, &recipe_id).await?;
    let favorite = app
        .favorites_for(&identity.account_id)
        .add_to_favorites(&recipe_id)
        .await?;
    Ok(Json(favorite))
}

pub async fn remove_favorite(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(recipe_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.favorites_for(&identity.account_id)
        .remove_from_favorites(&recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
