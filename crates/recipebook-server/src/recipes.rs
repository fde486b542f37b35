use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use recipebook_types::{ImageUpload, Recipe, RecipeDraft, RecipePatch};

use crate::app::AppState;
use crate::auth::{AuthUser, Identity};
use crate::error::ApiError;

pub async fn list_recipes(State(app): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(app.recipes.fetch_all().await?))
}

/// Served from the cache when possible.
pub async fn get_recipe(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    Ok(Json(lookup(&app, &id).await?))
}

/// The owner is always the caller, whatever the body says.
pub async fn create_recipe(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    body: Result<Json<RecipeDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let Json(mut draft) = body?;
    draft.owner_id = identity.account_id;
    draft.validate()?;
    let recipe = app.recipes.add(draft).await?;
    info!(id = %recipe.id, owner = %recipe.owner_id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<RecipePatch>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Json(patch) = body?;
    patch.validate()?;
    owned(&app, &id, &identity).await?;
    Ok(Json(app.recipes.update(&id, patch).await?))
}

/// Multipart form with an `image` file and an optional `recipe` JSON patch
/// applied in the same update.
pub async fn upload_image(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Recipe>, ApiError> {
    owned(&app, &id, &identity).await?;

    let mut image = None;
    let mut patch = RecipePatch::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                if let Some(ct) = content_type.as_deref() {
                    if !ct.starts_with("image/") {
                        return Err(ApiError::BadRequest(format!(
                            "unsupported content type: {ct}"
                        )));
                    }
                }
                let data = field.bytes().await?;
                if data.len() > app.max_image_bytes {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "image exceeds {} bytes",
                        app.max_image_bytes
                    )));
                }
                let mut upload = ImageUpload::new(file_name, data);
                if let Some(ct) = content_type {
                    upload = upload.with_content_type(ct);
                }
                image = Some(upload);
            }
            Some("recipe") => {
                let text = field.text().await?;
                patch = serde_json::from_str(&text)
                    .map_err(|e| ApiError::BadRequest(format!("invalid recipe field: {e}")))?;
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("missing image field".into()))?;
    if image.is_empty() {
        return Err(ApiError::BadRequest("image is empty".into()));
    }
    patch.validate()?;
    let recipe = app.recipes.update_with_image(&id, patch, Some(image)).await?;
    info!(%id, url = ?recipe.image_url, "recipe image replaced");
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(app): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    owned(&app, &id, &identity).await?;
    app.recipes.remove(&id).await?;
    info!(%id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_by_owner(
    State(app): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(app.recipe_service().list_by_owner(&owner).await?))
}

pub(crate) async fn lookup(app: &AppState, id: &str) -> Result<Recipe, ApiError> {
    match app.recipes.get_by_id(id) {
        Some(recipe) => Ok(recipe),
        None => Ok(app.recipe_service().get_by_id(id).await?),
    }
}

async fn owned(app: &AppState, id: &str, identity: &Identity) -> Result<Recipe, ApiError> {
    let recipe = lookup(app, id).await?;
    if !recipe.is_owned_by(&identity.account_id) {
        return Err(ApiError::Forbidden(format!(
            "recipe {id} belongs to another account"
        )));
    }
    Ok(recipe)
}
