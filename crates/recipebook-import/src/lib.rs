//! Recipe import for Recipe Book.
//!
//! Seeds the `recipes` collection from TheMealDB. Each meal of a category is
//! looked up, its text is machine-translated, and the missing fields
//! (difficulty, cooking time, servings) are drawn at random before the
//! recipe is written through [`recipebook_access::RecipeService`].
//!
//! Translation is best effort: a failed call keeps the original text.

pub mod config;
pub mod error;
pub mod importer;
pub mod source;
pub mod translate;

pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use importer::{ImportFailure, ImportReport, Importer};
pub use source::{Meal, MealDbClient, MealSummary, RecipeSource};
pub use translate::{IdentityTranslator, MyMemoryTranslator, Translator};
