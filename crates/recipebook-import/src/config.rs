use serde::{Deserialize, Serialize};

pub const DEFAULT_MEALDB_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_TRANSLATE_URL: &str = "https://api.mymemory.translated.net/get";

/// Settings for one import run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// TheMealDB category to pull from.
    pub category: String,
    /// How many meals of the category to import.
    pub limit: usize,
    /// Pause between two imported recipes, in milliseconds.
    pub delay_ms: u64,
    /// Owner recorded on every imported recipe.
    pub owner_id: String,
    /// MyMemory language pair, `source|target`.
    pub lang_pair: String,
    pub mealdb_url: String,
    pub translate_url: String,
    /// Fixed seed for the randomized fields. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            category: "Dessert".into(),
            limit: 5,
            delay_ms: 2000,
            owner_id: "system".into(),
            lang_pair: "en|bg".into(),
            mealdb_url: DEFAULT_MEALDB_URL.into(),
            translate_url: DEFAULT_TRANSLATE_URL.into(),
            seed: None,
        }
    }
}
