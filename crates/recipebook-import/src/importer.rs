use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use recipebook_access::RecipeService;
use recipebook_types::{Difficulty, Recipe, RecipeDraft};

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::source::{Meal, MealSummary, RecipeSource};
use crate::translate::Translator;

/// Characters of the instructions reused as the description.
const DESCRIPTION_CHARS: usize = 150;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub meal_id: String,
    pub meal_name: String,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub category: String,
    pub imported: Vec<Recipe>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn imported_ids(&self) -> impl Iterator<Item = &str> {
        self.imported.iter().map(|r| r.id.as_str())
    }
}

/// Pulls meals from a [`RecipeSource`], translates them and stores them as
/// recipes.
pub struct Importer {
    source: Arc<dyn RecipeSource>,
    translator: Arc<dyn Translator>,
    recipes: RecipeService,
    config: ImportConfig,
}

impl Importer {
    pub fn new(
        source: Arc<dyn RecipeSource>,
        translator: Arc<dyn Translator>,
        recipes: RecipeService,
        config: ImportConfig,
    ) -> Self {
        Self {
            source,
            translator,
            recipes,
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import the first `config.limit` meals of `config.category`.
    ///
    /// Only a failure to list the category aborts the run. A meal that
    /// cannot be looked up or stored is recorded in the report and skipped.
    pub async fn run(&self) -> ImportResult<ImportReport> {
        let category = self.config.category.as_str();
        info!(category, limit = self.config.limit, "starting recipe import");
        let meals = self.source.list_category(category).await?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut report = ImportReport {
            category: category.to_string(),
            ..Default::default()
        };

        let selected: Vec<MealSummary> = meals.into_iter().take(self.config.limit).collect();
        let count = selected.len();
        for (index, summary) in selected.into_iter().enumerate() {
            match self.import_one(&summary, &mut rng).await {
                Ok(recipe) => {
                    info!(meal = %summary.name, id = %recipe.id, "imported recipe");
                    report.imported.push(recipe);
                }
                Err(e) => {
                    warn!(meal = %summary.name, error = %e, "failed to import meal");
                    report.failures.push(ImportFailure {
                        meal_id: summary.id,
                        meal_name: summary.name,
                        reason: e.to_string(),
                    });
                }
            }
            if index + 1 < count && self.config.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }
        }

        info!(
            imported = report.imported.len(),
            failed = report.failures.len(),
            "recipe import finished"
        );
        Ok(report)
    }

    async fn import_one(&self, summary: &MealSummary, rng: &mut StdRng) -> ImportResult<Recipe> {
        let meal = self.source.lookup(&summary.id).await?;
        let draft = self.build_draft(meal, rng).await;
        self.recipes.create(draft).await.map_err(ImportError::from)
    }

    async fn build_draft(&self, meal: Meal, rng: &mut StdRng) -> RecipeDraft {
        let title = self.translate_or_keep(&meal.name).await;
        let instructions = self.translate_or_keep(&meal.instructions).await;
        let excerpt: String = meal.instructions.chars().take(DESCRIPTION_CHARS).collect();
        let description = format!("{}...", self.translate_or_keep(&excerpt).await);

        let mut ingredients = Vec::with_capacity(meal.ingredients.len());
        for line in &meal.ingredients {
            ingredients.push(self.translate_or_keep(line).await);
        }

        RecipeDraft {
            description,
            ingredients: ingredients.join("\n"),
            instructions,
            cooking_time: rng.gen_range(30..90),
            difficulty: Difficulty::ALL[rng.gen_range(0..Difficulty::ALL.len())],
            servings: rng.gen_range(2..6),
            image_url: meal.thumb,
            category: Some(self.config.category.clone()),
            ..RecipeDraft::new(title, self.config.owner_id.clone())
        }
    }

    async fn translate_or_keep(&self, text: &str) -> String {
        match self.translator.translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "translation failed, keeping original text");
                text.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
