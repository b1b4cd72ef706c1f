//! Recipe write payloads and their validation.
//!
//! Validation is pure: the caller looks up which referenced ingredient and
//! tag ids exist and hands them in as [`KnownIds`]. Checks run in a fixed
//! order and the first failure is reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::image::{DecodedImage, ImageError, decode_data_uri};
use crate::types::{IngredientId, TagId};

/// Shortest accepted cooking time, in minutes.
pub const MIN_COOKING_TIME: i32 = 1;
/// Longest accepted cooking time, in minutes.
pub const MAX_COOKING_TIME: i32 = 300;
/// Smallest accepted ingredient amount.
pub const MIN_AMOUNT: i32 = 1;
/// Maximum recipe name length in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Reasons a recipe payload is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    #[error("cooking time must be between 1 and 300 minutes")]
    CookingTimeOutOfRange(i32),

    #[error("at least one ingredient is required")]
    MissingIngredients,

    #[error("ingredient does not exist")]
    UnknownIngredient(IngredientId),

    #[error("ingredients must not repeat")]
    DuplicateIngredient(IngredientId),

    #[error("amount must be ≥ 1")]
    AmountTooSmall {
        ingredient: IngredientId,
        amount: i32,
    },

    #[error("at least one tag is required")]
    MissingTags,

    #[error("tags must not repeat")]
    DuplicateTag(TagId),

    #[error("tag does not exist")]
    UnknownTag(TagId),

    #[error("name must not be blank")]
    BlankName,

    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("text must not be blank")]
    BlankText,

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// One `{id, amount}` entry of a recipe payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: IngredientId,
    pub amount: i32,
}

/// Body of a create request. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Body of a partial update. Absent fields are left untouched; a present
/// `tags` or `ingredients` list replaces the stored set wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

/// Ids from a payload that were found in the catalog.
#[derive(Debug, Clone, Default)]
pub struct KnownIds {
    pub ingredients: HashSet<IngredientId>,
    pub tags: HashSet<TagId>,
}

/// A create payload that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: DecodedImage,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientAmount>,
}

/// A partial update that passed every check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<DecodedImage>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

impl ValidatedPatch {
    /// True when the patch touches a column of the recipe row itself.
    #[must_use]
    pub const fn touches_row(&self) -> bool {
        self.name.is_some()
            || self.text.is_some()
            || self.cooking_time.is_some()
            || self.image.is_some()
    }
}

impl RecipeInput {
    /// Ingredient ids referenced by the payload, in payload order.
    #[must_use]
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.ingredients.iter().map(|line| line.id).collect()
    }

    /// Validate the payload against the ids known to exist.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecipeValidationError`] encountered.
    pub fn validate(self, known: &KnownIds) -> Result<ValidatedRecipe, RecipeValidationError> {
        let cooking_time = validate_cooking_time(self.cooking_time)?;
        validate_ingredients(&self.ingredients, &known.ingredients)?;
        validate_tags(&self.tags, &known.tags)?;
        let name = validate_name(self.name)?;
        let text = validate_text(self.text)?;
        let image = decode_data_uri(&self.image)?;

        Ok(ValidatedRecipe {
            name,
            text,
            cooking_time,
            image,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}

/// A full replacement is a patch that supplies every field.
impl From<RecipeInput> for RecipePatch {
    fn from(input: RecipeInput) -> Self {
        Self {
            name: Some(input.name),
            text: Some(input.text),
            cooking_time: Some(input.cooking_time),
            image: Some(input.image),
            tags: Some(input.tags),
            ingredients: Some(input.ingredients),
        }
    }
}

impl RecipePatch {
    /// Ingredient ids referenced by the patch, if it carries ingredients.
    #[must_use]
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.ingredients
            .iter()
            .flatten()
            .map(|line| line.id)
            .collect()
    }

    /// Validate only the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecipeValidationError`] encountered.
    pub fn validate(self, known: &KnownIds) -> Result<ValidatedPatch, RecipeValidationError> {
        let cooking_time = self.cooking_time.map(validate_cooking_time).transpose()?;
        if let Some(ingredients) = &self.ingredients {
            validate_ingredients(ingredients, &known.ingredients)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags, &known.tags)?;
        }
        let name = self.name.map(validate_name).transpose()?;
        let text = self.text.map(validate_text).transpose()?;
        let image = self.image.as_deref().map(decode_data_uri).transpose()?;

        Ok(ValidatedPatch {
            name,
            text,
            cooking_time,
            image,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}

/// Check that a cooking time lies in `[1, 300]`.
///
/// # Errors
///
/// Returns [`RecipeValidationError::CookingTimeOutOfRange`] otherwise.
pub fn validate_cooking_time(minutes: i32) -> Result<i32, RecipeValidationError> {
    if minutes < MIN_COOKING_TIME || minutes > MAX_COOKING_TIME {
        return Err(RecipeValidationError::CookingTimeOutOfRange(minutes));
    }
    Ok(minutes)
}

/// Check an ingredient list: non-empty, every id known, no repeats, every
/// amount at least one.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_ingredients(
    lines: &[IngredientAmount],
    known: &HashSet<IngredientId>,
) -> Result<(), RecipeValidationError> {
    if lines.is_empty() {
        return Err(RecipeValidationError::MissingIngredients);
    }

    if let Some(line) = lines.iter().find(|line| !known.contains(&line.id)) {
        return Err(RecipeValidationError::UnknownIngredient(line.id));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    if let Some(line) = lines.iter().find(|line| !seen.insert(line.id)) {
        return Err(RecipeValidationError::DuplicateIngredient(line.id));
    }

    if let Some(line) = lines.iter().find(|line| line.amount < MIN_AMOUNT) {
        return Err(RecipeValidationError::AmountTooSmall {
            ingredient: line.id,
            amount: line.amount,
        });
    }

    Ok(())
}

/// Check a tag list: non-empty, no repeats, every id known.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_tags(tags: &[TagId], known: &HashSet<TagId>) -> Result<(), RecipeValidationError> {
    if tags.is_empty() {
        return Err(RecipeValidationError::MissingTags);
    }

    let mut seen = HashSet::with_capacity(tags.len());
    if let Some(tag) = tags.iter().find(|tag| !seen.insert(**tag)) {
        return Err(RecipeValidationError::DuplicateTag(*tag));
    }

    if let Some(tag) = tags.iter().find(|tag| !known.contains(*tag)) {
        return Err(RecipeValidationError::UnknownTag(*tag));
    }

    Ok(())
}

fn validate_name(name: String) -> Result<String, RecipeValidationError> {
    if name.trim().is_empty() {
        return Err(RecipeValidationError::BlankName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RecipeValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name)
}

fn validate_text(text: String) -> Result<String, RecipeValidationError> {
    if text.trim().is_empty() {
        return Err(RecipeValidationError::BlankText);
    }
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn known() -> KnownIds {
        KnownIds {
            ingredients: [1, 2, 3].into_iter().map(IngredientId::new).collect(),
            tags: [1, 2].into_iter().map(TagId::new).collect(),
        }
    }

    fn line(id: i32, amount: i32) -> IngredientAmount {
        IngredientAmount {
            id: IngredientId::new(id),
            amount,
        }
    }

    fn input() -> RecipeInput {
        RecipeInput {
            name: "Borscht".to_owned(),
            text: "Boil beets.".to_owned(),
            cooking_time: 90,
            image: PNG.to_owned(),
            tags: vec![TagId::new(2), TagId::new(1)],
            ingredients: vec![line(3, 200), line(1, 50)],
        }
    }

    #[test]
    fn test_valid_input_is_preserved() {
        let validated = input().validate(&known()).unwrap();
        assert_eq!(validated.name, "Borscht");
        assert_eq!(validated.text, "Boil beets.");
        assert_eq!(validated.cooking_time, 90);
        assert_eq!(validated.tags, vec![TagId::new(2), TagId::new(1)]);
        assert_eq!(validated.ingredients, vec![line(3, 200), line(1, 50)]);
        assert_eq!(validated.image.extension, "png");
    }

    #[test]
    fn test_cooking_time_boundaries() {
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(300).is_ok());
        assert_eq!(
            validate_cooking_time(0),
            Err(RecipeValidationError::CookingTimeOutOfRange(0))
        );
        assert_eq!(
            validate_cooking_time(301),
            Err(RecipeValidationError::CookingTimeOutOfRange(301))
        );
    }

    #[test]
    fn test_cooking_time_checked_first() {
        let mut payload = input();
        payload.cooking_time = 0;
        payload.ingredients.clear();
        assert!(matches!(
            payload.validate(&known()),
            Err(RecipeValidationError::CookingTimeOutOfRange(0))
        ));
    }

    #[test]
    fn test_empty_ingredients() {
        let err = validate_ingredients(&[], &known().ingredients).unwrap_err();
        assert_eq!(err, RecipeValidationError::MissingIngredients);
    }

    #[test]
    fn test_unknown_ingredient() {
        let err = validate_ingredients(&[line(1, 5), line(99, 5)], &known().ingredients)
            .unwrap_err();
        assert_eq!(err, RecipeValidationError::UnknownIngredient(IngredientId::new(99)));
        assert_eq!(err.to_string(), "ingredient does not exist");
    }

    #[test]
    fn test_duplicate_ingredient() {
        let err = validate_ingredients(&[line(1, 5), line(2, 1), line(1, 7)], &known().ingredients)
            .unwrap_err();
        assert_eq!(err, RecipeValidationError::DuplicateIngredient(IngredientId::new(1)));
        assert_eq!(err.to_string(), "ingredients must not repeat");
    }

    #[test]
    fn test_amount_below_one() {
        let err = validate_ingredients(&[line(1, 0)], &known().ingredients).unwrap_err();
        assert!(matches!(err, RecipeValidationError::AmountTooSmall { amount: 0, .. }));
        assert_eq!(err.to_string(), "amount must be ≥ 1");
    }

    #[test]
    fn test_tags_rules() {
        let known = known().tags;
        assert_eq!(validate_tags(&[], &known), Err(RecipeValidationError::MissingTags));
        assert_eq!(
            validate_tags(&[TagId::new(1), TagId::new(1)], &known),
            Err(RecipeValidationError::DuplicateTag(TagId::new(1)))
        );
        assert_eq!(
            validate_tags(&[TagId::new(7)], &known),
            Err(RecipeValidationError::UnknownTag(TagId::new(7)))
        );
        assert!(validate_tags(&[TagId::new(1), TagId::new(2)], &known).is_ok());
    }

    #[test]
    fn test_name_and_text() {
        let mut payload = input();
        payload.name = "   ".to_owned();
        assert_eq!(
            payload.validate(&known()).unwrap_err(),
            RecipeValidationError::BlankName
        );

        let mut payload = input();
        payload.name = "я".repeat(201);
        assert!(matches!(
            payload.validate(&known()),
            Err(RecipeValidationError::NameTooLong { max: 200 })
        ));

        let mut payload = input();
        payload.text = String::new();
        assert_eq!(
            payload.validate(&known()).unwrap_err(),
            RecipeValidationError::BlankText
        );
    }

    #[test]
    fn test_bad_image() {
        let mut payload = input();
        payload.image = "not-an-image".to_owned();
        assert_eq!(
            payload.validate(&known()).unwrap_err(),
            RecipeValidationError::Image(ImageError::NotDataUri)
        );
    }

    #[test]
    fn test_patch_validates_only_present_fields() {
        let patch = RecipePatch {
            cooking_time: Some(300),
            ..RecipePatch::default()
        };
        let validated = patch.validate(&KnownIds::default()).unwrap();
        assert_eq!(validated.cooking_time, Some(300));
        assert!(validated.tags.is_none());
        assert!(validated.ingredients.is_none());
        assert!(validated.touches_row());
    }

    #[test]
    fn test_patch_rejects_duplicate_ingredients() {
        let patch = RecipePatch {
            ingredients: Some(vec![line(2, 1), line(2, 3)]),
            ..RecipePatch::default()
        };
        assert_eq!(patch.ingredient_ids(), vec![IngredientId::new(2), IngredientId::new(2)]);
        assert_eq!(
            patch.validate(&known()).unwrap_err(),
            RecipeValidationError::DuplicateIngredient(IngredientId::new(2))
        );
    }

    #[test]
    fn test_patch_with_only_tags_does_not_touch_row() {
        let patch = RecipePatch {
            tags: Some(vec![TagId::new(1)]),
            ..RecipePatch::default()
        };
        let validated = patch.validate(&known()).unwrap();
        assert!(!validated.touches_row());
        assert_eq!(validated.tags, Some(vec![TagId::new(1)]));
    }

    #[test]
    fn test_full_replacement_keeps_create_checks() {
        let validated = RecipePatch::from(input()).validate(&known()).unwrap();
        assert!(validated.touches_row());
        assert!(validated.image.is_some());
        assert_eq!(validated.tags, Some(vec![TagId::new(2), TagId::new(1)]));

        let mut payload = input();
        payload.tags = Vec::new();
        assert_eq!(
            RecipePatch::from(payload).validate(&known()).unwrap_err(),
            RecipeValidationError::MissingTags
        );
    }

    #[test]
    fn test_deserialize_create_payload() {
        let json = r#"{
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 1,
            "image": "data:image/png;base64,iVBORw0KGgo=",
            "tags": [1],
            "ingredients": [{"id": 2, "amount": 10}]
        }"#;
        let payload: RecipeInput = serde_json::from_str(json).unwrap();
        assert_eq!(payload.ingredient_ids(), vec![IngredientId::new(2)]);
        assert!(payload.validate(&known()).is_ok());
    }
}
