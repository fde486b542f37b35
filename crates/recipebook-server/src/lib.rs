//! HTTP server for Recipe Book.
//!
//! Exposes the recipe state store, the favorites layer and stored images
//! over a JSON API. Mutations require a bearer token resolved through an
//! [`AuthProvider`]; recipes can only be changed by their owner.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod favorites;
pub mod handler;
pub mod recipes;
pub mod router;
pub mod server;

pub use app::AppState;
pub use auth::{AuthProvider, AuthUser, Credentials, Identity, StaticTokenAuth};
pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use server::{blob_store, RecipeBookServer};
