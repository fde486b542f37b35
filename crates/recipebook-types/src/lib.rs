//! Foundation types for Recipe Book.
//!
//! This crate provides the typed records that travel between the document
//! store, the access layer and the state stores. Documents are schemaless on
//! the wire; everything above the store works with the explicit types here.
//!
//! # Key Types
//!
//! - [`Recipe`] -- A stored recipe with its store-assigned id and timestamps
//! - [`RecipeDraft`] -- Caller-supplied fields for a new recipe
//! - [`RecipePatch`] -- Partial update; absent fields are left untouched
//! - [`Difficulty`] -- `easy | medium | hard`
//! - [`Favorite`] -- Join record between an account and a recipe
//! - [`ImageUpload`] -- Binary image content supplied with an update

pub mod error;
pub mod favorite;
pub mod image;
pub mod recipe;

pub use error::{TypeError, TypeResult};
pub use favorite::Favorite;
pub use image::{ImageUpload, RECIPE_IMAGES_PREFIX};
pub use recipe::{Difficulty, Recipe, RecipeDraft, RecipePatch};

/// Wall-clock timestamp used for `createdAt` / `updatedAt`.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Field map of a schemaless document.
pub type Fields = serde_json::Map<String, serde_json::Value>;
