//! Shopping-list download.

use std::collections::HashMap;

use foodgram_core::collection::Collection;
use foodgram_core::shopping_list::ShoppingList;
use foodgram_core::views::IngredientView;
use foodgram_core::UserId;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{CollectionRepository, RecipeRepository};
use crate::error::Result;

/// Sum the ingredients of every recipe in `user`'s cart and render them as
/// plain text. An empty cart renders an empty document.
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
#[instrument(skip_all, fields(user = %user))]
pub async fn render_for(pool: &PgPool, user: UserId) -> Result<String> {
    let cart = CollectionRepository::new(pool, Collection::ShoppingCart)
        .recipes_of(user)
        .await?;
    let lines = RecipeRepository::new(pool).ingredient_lines(&cart).await?;

    let mut catalog: HashMap<_, IngredientView> = HashMap::new();
    let list = ShoppingList::from_recipes(cart.iter().map(|recipe| {
        lines
            .get(recipe)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|line| (line.id, line.amount))
    }));

    for line in lines.values().flatten() {
        catalog.entry(line.id).or_insert_with(|| IngredientView {
            id: line.id,
            name: line.name.clone(),
            measurement_unit: line.measurement_unit.clone(),
        });
    }

    tracing::debug!(recipes = cart.len(), ingredients = list.len(), "shopping list built");
    Ok(list.render(&catalog)?)
}
