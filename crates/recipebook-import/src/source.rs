use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ImportError, ImportResult};

/// TheMealDB numbers its ingredient slots `strIngredient1..=20`.
const INGREDIENT_SLOTS: usize = 20;

/// A meal as listed by a category filter.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MealSummary {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumb: Option<String>,
}

/// A fully looked-up meal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub instructions: String,
    pub thumb: Option<String>,
    /// `"<measure> <ingredient>"` per filled slot, in slot order.
    pub ingredients: Vec<String>,
}

impl Meal {
    /// Build a meal from one raw `lookup.php` entry.
    pub fn from_fields(fields: &Map<String, Value>) -> ImportResult<Self> {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let id = text("idMeal")
            .ok_or_else(|| ImportError::MalformedResponse("meal without idMeal".into()))?;

        let mut ingredients = Vec::new();
        for slot in 1..=INGREDIENT_SLOTS {
            let Some(ingredient) = text(&format!("strIngredient{slot}")) else {
                continue;
            };
            match text(&format!("strMeasure{slot}")) {
                Some(measure) => ingredients.push(format!("{measure} {ingredient}")),
                None => ingredients.push(ingredient.to_string()),
            }
        }

        Ok(Self {
            id: id.to_string(),
            name: text("strMeal").unwrap_or_default().to_string(),
            instructions: text("strInstructions").unwrap_or_default().to_string(),
            thumb: text("strMealThumb").map(str::to_string),
            ingredients,
        })
    }
}

/// Where imported meals come from.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Meals in `category`, in source order.
    async fn list_category(&self, category: &str) -> ImportResult<Vec<MealSummary>>;

    /// Full details for one meal.
    async fn lookup(&self, meal_id: &str) -> ImportResult<Meal>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    meals: Option<Vec<T>>,
}

/// Client for TheMealDB's public JSON API.
#[derive(Clone, Debug)]
pub struct MealDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RecipeSource for MealDbClient {
    async fn list_category(&self, category: &str) -> ImportResult<Vec<MealSummary>> {
        let url = format!("{}/filter.php", self.base_url);
        let envelope: Envelope<MealSummary> = self
            .client
            .get(&url)
            .query(&[("c", category)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let meals = envelope.meals.unwrap_or_default();
        debug!(category, count = meals.len(), "listed category");
        Ok(meals)
    }

    async fn lookup(&self, meal_id: &str) -> ImportResult<Meal> {
        let url = format!("{}/lookup.php", self.base_url);
        let envelope: Envelope<Map<String, Value>> = self
            .client
            .get(&url)
            .query(&[("i", meal_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let fields = envelope
            .meals
            .and_then(|meals| meals.into_iter().next())
            .ok_or_else(|| ImportError::MealNotFound(meal_id.to_string()))?;
        Meal::from_fields(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn meal_collects_filled_ingredient_slots() {
        let raw = fields(json!({
            "idMeal": "52768",
            "strMeal": "Apple Frangipan Tart",
            "strInstructions": "Preheat the oven.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/wxywrq1468235067.jpg",
            "strIngredient1": "digestive biscuits",
            "strMeasure1": "175g/6oz",
            "strIngredient2": "butter",
            "strMeasure2": null,
            "strIngredient3": "  ",
            "strMeasure3": "1 tsp",
            "strIngredient4": null,
            "strIngredient5": "Bramley apples",
            "strMeasure5": "200g",
        }));
        let meal = Meal::from_fields(&raw).unwrap();
        assert_eq!(meal.id, "52768");
        assert_eq!(meal.name, "Apple Frangipan Tart");
        assert_eq!(
            meal.ingredients,
            vec!["175g/6oz digestive biscuits", "butter", "200g Bramley apples"]
        );
        assert!(meal.thumb.unwrap().ends_with(".jpg"));
    }

    #[test]
    fn meal_without_id_is_malformed() {
        let raw = fields(json!({ "strMeal": "Nameless" }));
        assert!(matches!(
            Meal::from_fields(&raw),
            Err(ImportError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_category_decodes_to_no_meals() {
        let envelope: Envelope<MealSummary> = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(envelope.meals.is_none());
    }

    #[test]
    fn summaries_decode_from_filter_payload() {
        let envelope: Envelope<MealSummary> = serde_json::from_str(
            r#"{"meals":[{"strMeal":"Bakewell tart","strMealThumb":"https://x/t.jpg","idMeal":"52767"}]}"#,
        )
        .unwrap();
        let meals = envelope.meals.unwrap();
        assert_eq!(meals[0].id, "52767");
        assert_eq!(meals[0].name, "Bakewell tart");
    }

    #[test]
    fn base_url_is_normalized() {
        let client = MealDbClient::new("https://www.themealdb.com/api/json/v1/1/");
        assert_eq!(client.base_url(), "https://www.themealdb.com/api/json/v1/1");
    }
}
