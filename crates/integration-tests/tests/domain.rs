//! Recipe rules exercised end to end through the public core API.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use foodgram_core::filter::{RecipeFacts, RecipeQuery, matches_all};
use foodgram_core::recipe::{KnownIds, RecipeInput, RecipeValidationError};
use foodgram_core::search::IngredientSearch;
use foodgram_core::shopping_list::ShoppingList;
use foodgram_core::views::IngredientView;
use foodgram_core::{IngredientId, TagId, UserId};

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

fn known() -> KnownIds {
    KnownIds {
        ingredients: (1..=4).map(IngredientId::new).collect(),
        tags: (1..=3).map(TagId::new).collect(),
    }
}

// =============================================================================
// Create payloads
// =============================================================================

#[test]
fn test_create_payload_round_trips_through_validation() {
    let payload = serde_json::json!({
        "name": "Pancakes",
        "text": "Mix and fry.",
        "cooking_time": 25,
        "image": PNG,
        "tags": [3, 1],
        "ingredients": [{"id": 2, "amount": 300}, {"id": 4, "amount": 2}]
    });

    let input: RecipeInput = serde_json::from_value(payload).unwrap();
    let recipe = input.validate(&known()).unwrap();

    assert_eq!(recipe.name, "Pancakes");
    assert_eq!(recipe.text, "Mix and fry.");
    assert_eq!(recipe.cooking_time, 25);
    assert_eq!(recipe.tags, vec![TagId::new(3), TagId::new(1)]);
    assert_eq!(
        recipe
            .ingredients
            .iter()
            .map(|line| (line.id.as_i32(), line.amount))
            .collect::<Vec<_>>(),
        vec![(2, 300), (4, 2)]
    );
}

#[test]
fn test_create_payload_rejections() {
    let base = serde_json::json!({
        "name": "Soup",
        "text": "Simmer.",
        "cooking_time": 301,
        "image": PNG,
        "tags": [1],
        "ingredients": [{"id": 1, "amount": 1}]
    });
    let input: RecipeInput = serde_json::from_value(base).unwrap();
    assert_eq!(
        input.validate(&known()).unwrap_err(),
        RecipeValidationError::CookingTimeOutOfRange(301)
    );

    let duplicate_tags = serde_json::json!({
        "name": "Soup",
        "text": "Simmer.",
        "cooking_time": 30,
        "image": PNG,
        "tags": [1, 1],
        "ingredients": [{"id": 1, "amount": 1}]
    });
    let input: RecipeInput = serde_json::from_value(duplicate_tags).unwrap();
    assert_eq!(
        input.validate(&known()).unwrap_err(),
        RecipeValidationError::DuplicateTag(TagId::new(1))
    );
}

// =============================================================================
// Listing filters
// =============================================================================

struct Recipe {
    author: UserId,
    tags: Vec<String>,
    favorited_by: Vec<UserId>,
}

fn catalog() -> Vec<Recipe> {
    let slugs = |s: &[&str]| -> Vec<String> { s.iter().map(|&x| x.to_owned()).collect() };
    vec![
        Recipe {
            author: UserId::new(1),
            tags: slugs(&["breakfast"]),
            favorited_by: vec![UserId::new(9)],
        },
        Recipe {
            author: UserId::new(1),
            tags: slugs(&["dinner"]),
            favorited_by: vec![],
        },
        Recipe {
            author: UserId::new(2),
            tags: slugs(&["lunch", "dinner"]),
            favorited_by: vec![UserId::new(9)],
        },
        Recipe {
            author: UserId::new(2),
            tags: slugs(&["dessert"]),
            favorited_by: vec![],
        },
    ]
}

fn select(query: &str, viewer: Option<UserId>) -> Vec<usize> {
    let pairs = query.split('&').filter_map(|pair| pair.split_once('='));
    let query = RecipeQuery::from_pairs(pairs).unwrap();
    let predicates = query.predicates(viewer);

    catalog()
        .iter()
        .enumerate()
        .filter(|(_, recipe)| {
            matches_all(
                &predicates,
                &RecipeFacts {
                    author: recipe.author,
                    tag_slugs: &recipe.tags,
                    favorited_by: &recipe.favorited_by,
                    in_cart_of: &[],
                },
            )
        })
        .map(|(index, _)| index)
        .collect()
}

#[test]
fn test_two_tags_return_the_union() {
    assert_eq!(select("tags=breakfast&tags=dinner", None), vec![0, 1, 2]);
}

#[test]
fn test_unknown_tag_matches_nothing() {
    assert!(select("tags=brunch", None).is_empty());
}

#[test]
fn test_filters_intersect() {
    assert_eq!(select("author=2&tags=dinner", None), vec![2]);
    assert_eq!(
        select("is_favorited=1&tags=dinner", Some(UserId::new(9))),
        vec![2]
    );
}

#[test]
fn test_favorited_flag_ignored_for_anonymous() {
    assert_eq!(select("is_favorited=true", None), vec![0, 1, 2, 3]);
}

// =============================================================================
// Ingredient search
// =============================================================================

#[test]
fn test_ingredient_search_example() {
    let search = IngredientSearch::parse(Some("тома"));
    let names = ["Томат", "Соус томатный", "Кетчуп"];
    let hits: Vec<_> = names.into_iter().filter(|n| search.matches(n)).collect();

    assert_eq!(hits, vec!["Томат", "Соус томатный"]);
}

// =============================================================================
// Shopping list
// =============================================================================

#[test]
fn test_shopping_list_for_two_recipes() {
    let flour = IngredientId::new(1);
    let sugar = IngredientId::new(2);
    let catalog: HashMap<_, _> = [
        (flour, "flour"),
        (sugar, "sugar"),
    ]
    .into_iter()
    .map(|(id, name)| {
        (
            id,
            IngredientView {
                id,
                name: name.to_owned(),
                measurement_unit: "g".to_owned(),
            },
        )
    })
    .collect();

    let list = ShoppingList::from_recipes([vec![(flour, 100), (sugar, 20)], vec![(flour, 50)]]);
    assert_eq!(list.render(&catalog).unwrap(), "flour - 150 g\nsugar - 20 g\n");
}
