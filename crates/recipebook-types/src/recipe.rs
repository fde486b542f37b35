use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TypeError, TypeResult};
use crate::{Fields, Timestamp};

/// How demanding a recipe is to prepare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "лесна")]
    Easy,
    #[default]
    #[serde(alias = "средна")]
    Medium,
    #[serde(alias = "трудна")]
    Hard,
}

impl Difficulty {
    /// Every difficulty, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "лесна" => Ok(Self::Easy),
            "medium" | "средна" => Ok(Self::Medium),
            "hard" | "трудна" => Ok(Self::Hard),
            _ => Err(TypeError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Caller-supplied fields of a new recipe.
///
/// Everything a [`Recipe`] carries except the store-assigned id and the
/// timestamps, which the access layer attaches on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Newline-delimited ingredient list. Line order is display order.
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    /// Minutes.
    pub cooking_time: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, alias = "userId")]
    pub owner_id: String,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    /// Check the caller-facing constraints: a title, and positive
    /// cooking time and servings.
    pub fn validate(&self) -> TypeResult<()> {
        check_title(&self.title)?;
        check_positive("cookingTime", self.cooking_time)?;
        check_positive("servings", self.servings)
    }

    /// Document fields for a freshly created recipe, stamped with `now` as
    /// both `createdAt` and `updatedAt`.
    pub fn to_document(&self, now: Timestamp) -> TypeResult<Fields> {
        let mut fields = to_fields(self)?;
        let stamp = serde_json::to_value(now)?;
        fields.insert("createdAt".into(), stamp.clone());
        fields.insert("updatedAt".into(), stamp);
        Ok(fields)
    }

    /// Attach an id and creation time, producing the stored view.
    pub fn into_recipe(self, id: impl Into<String>, now: Timestamp) -> Recipe {
        Recipe {
            id: id.into(),
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            cooking_time: self.cooking_time,
            difficulty: self.difficulty,
            servings: self.servings,
            image_url: self.image_url,
            category: self.category,
            owner_id: self.owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Store-assigned, immutable.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    pub cooking_time: u32,
    pub difficulty: Difficulty,
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Older documents carry the owner under `userId`.
    #[serde(default, alias = "userId")]
    pub owner_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Recipe {
    /// Decode a stored document. The store-assigned `id` always wins over
    /// any `id` field inside the document body.
    pub fn from_document(id: &str, mut fields: Fields) -> TypeResult<Self> {
        fields.insert("id".into(), Value::String(id.to_string()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Non-empty ingredient lines, in stored order.
    pub fn ingredient_lines(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    /// Returns `true` if `account_id` is the (non-empty) owner of this recipe.
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        !self.owner_id.is_empty() && self.owner_id == account_id
    }
}

/// A partial recipe update. Absent fields are left untouched by the merge.
///
/// `id`, `ownerId` and `createdAt` are deliberately not representable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> TypeResult<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(minutes) = self.cooking_time {
            check_positive("cookingTime", minutes)?;
        }
        if let Some(servings) = self.servings {
            check_positive("servings", servings)?;
        }
        Ok(())
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Only the fields that are present.
    pub fn to_fields(&self) -> TypeResult<Fields> {
        to_fields(self)
    }
}

impl From<RecipeDraft> for RecipePatch {
    fn from(draft: RecipeDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            ingredients: Some(draft.ingredients),
            instructions: Some(draft.instructions),
            cooking_time: Some(draft.cooking_time),
            difficulty: Some(draft.difficulty),
            servings: Some(draft.servings),
            image_url: draft.image_url,
            category: draft.category,
        }
    }
}

fn to_fields<T: Serialize>(value: &T) -> TypeResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(TypeError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn check_title(title: &str) -> TypeResult<()> {
    if title.trim().is_empty() {
        return Err(TypeError::Invalid {
            field: "title",
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: u32) -> TypeResult<()> {
    if value == 0 {
        return Err(TypeError::Invalid {
            field,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}
