use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::{favorites, handler, recipes};

/// Room for multipart framing and the `recipe` field on top of the image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the axum router with all Recipe Book endpoints.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let body_limit = state.max_image_bytes + MULTIPART_OVERHEAD;
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/status", get(handler::status_handler))
        .route(
            "/v1/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/v1/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/v1/recipes/:id/image", post(recipes::upload_image))
        .route("/v1/users/:owner/recipes", get(recipes::list_by_owner))
        .route("/v1/favorites", get(favorites::list_favorites))
        .route("/v1/favorites/recipes", get(favorites::favorite_recipes))
        .route(
            "/v1/favorites/:recipe_id",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/v1/images/*path", get(handler::image_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
