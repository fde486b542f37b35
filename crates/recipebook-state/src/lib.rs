//! In-process state stores for Recipe Book.
//!
//! A state store is the single in-process source of truth for "the recipes
//! the UI currently knows about". It mirrors access-layer results into a
//! cache and patches that cache after every successful mutation, so
//! presentation code never has to refetch to stay consistent.
//!
//! Request status is tracked per request rather than in one shared slot:
//! every operation registers a [`RequestId`] with the store's
//! [`RequestTracker`] on entry and settles it on exit, whatever the outcome.
//! Overlapping calls therefore never clobber each other's status.
//!
//! # Modules
//!
//! - [`recipes`] -- [`RecipeState`], the recipe collection cache
//! - [`favorites`] -- [`FavoritesState`], one account's favorite ids
//! - [`status`] -- [`RequestTracker`] and its records

pub mod error;
pub mod favorites;
pub mod recipes;
pub mod status;

pub use error::{StateError, StateResult};
pub use favorites::FavoritesState;
pub use recipes::RecipeState;
pub use status::{
    Operation, RequestGuard, RequestId, RequestRecord, RequestStatus, RequestTracker,
    DEFAULT_SETTLED_CAPACITY,
};
