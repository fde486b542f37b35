use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::TypeResult;
use crate::{Fields, Timestamp};

/// Join record between an account and a recipe it has marked as favored.
///
/// Stored under [`Favorite::key`], so there is at most one record per
/// account/recipe pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub recipe_id: String,
    pub created_at: Timestamp,
}

impl Favorite {
    pub fn new(owner_id: impl Into<String>, recipe_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            recipe_id: recipe_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Document key for the pair: `<ownerId>_<recipeId>`.
    pub fn key(owner_id: &str, recipe_id: &str) -> String {
        format!("{owner_id}_{recipe_id}")
    }

    pub fn document_key(&self) -> String {
        Self::key(&self.owner_id, &self.recipe_id)
    }

    pub fn to_document(&self) -> TypeResult<Fields> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(crate::TypeError::Serialization(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub fn from_document(fields: Fields) -> TypeResult<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_concatenates_ids() {
        assert_eq!(Favorite::key("u1", "r9"), "u1_r9");
        let fav = Favorite::new("u1", "r9");
        assert_eq!(fav.document_key(), "u1_r9");
    }

    #[test]
    fn document_fields() {
        let fav = Favorite::new("u1", "r9");
        let fields = fav.to_document().unwrap();
        assert_eq!(fields["ownerId"], json!("u1"));
        assert_eq!(fields["recipeId"], json!("r9"));
        assert!(fields.contains_key("createdAt"));
        assert_eq!(Favorite::from_document(fields).unwrap(), fav);
    }

    #[test]
    fn legacy_user_id_decodes() {
        let serde_json::Value::Object(fields) = json!({
            "userId": "u2",
            "recipeId": "r1",
            "createdAt": "2024-03-01T10:00:00Z",
        }) else {
            unreachable!()
        };
        let fav = Favorite::from_document(fields).unwrap();
        assert_eq!(fav.owner_id, "u2");
    }
}
