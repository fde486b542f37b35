//! Access layer for Recipe Book.
//!
//! The sole boundary between domain code and the remote document and blob
//! stores. Domain operations (list, get, create, update, delete, list by
//! owner) are translated into store calls here; timestamps are attached and
//! uploaded images are resolved to durable URLs before anything is persisted.
//!
//! No business validation happens at this layer, and store failures are
//! always handed back to the caller unchanged: no retries, no suppression.
//!
//! # Modules
//!
//! - [`recipes`] -- [`RecipeService`] over the `recipes` collection
//! - [`favorites`] -- [`FavoritesService`] over the `favorites` collection
//! - [`error`] -- [`AccessError`], separating domain not-found from transport

pub mod error;
pub mod favorites;
pub mod recipes;

pub use error::{AccessError, AccessResult};
pub use favorites::{FavoritesService, FAVORITES_COLLECTION};
pub use recipes::{RecipeService, RECIPES_COLLECTION};
