//! Read representations returned by the API.
//!
//! Write payloads live in [`crate::recipe`]; these are what clients get back.

use serde::{Deserialize, Serialize};

use crate::types::{IngredientId, RecipeId, TagId, UserId};

/// A tag as listed by `/api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// An ingredient without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientView {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// An ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientView {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// A user as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the viewer follows this user. Always false for anonymous viewers.
    pub is_subscribed: bool,
}

/// Full recipe representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: RecipeId,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe representation used by toggles and subscription lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeShortView {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub email: String,
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortView>,
    pub recipes_count: i64,
}

impl SubscriptionView {
    /// Combine an author with their recipe preview.
    #[must_use]
    pub fn new(author: UserView, recipes: Vec<RecipeShortView>, recipes_count: i64) -> Self {
        Self {
            email: author.email,
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: author.is_subscribed,
            recipes,
            recipes_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_view_field_names() {
        let author = UserView {
            id: UserId::new(4),
            email: "cook@example.com".to_owned(),
            username: "cook".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            is_subscribed: true,
        };
        let view = SubscriptionView::new(author, Vec::new(), 12);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 4);
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["recipes_count"], 12);
        assert!(json["recipes"].as_array().unwrap().is_empty());
    }
}
