//! Ingredient route handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};

use foodgram_core::IngredientId;
use foodgram_core::search::IngredientSearch;
use foodgram_core::views::IngredientView;

use super::{parse_id, query_pairs};
use crate::db::IngredientRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// List ingredients, optionally searched by `name`.
///
/// GET /api/ingredients?name=...
///
/// Prefix matches come first. Without a `name` the whole catalog is
/// returned, ordered by name.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(_): OptionalAuth,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<IngredientView>>> {
    let pairs = query_pairs(raw.as_deref());
    let name = pairs
        .iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.as_str());

    let search = IngredientSearch::parse(name);
    let ingredients = IngredientRepository::new(state.pool())
        .search(&search)
        .await?;
    Ok(Json(ingredients))
}

/// Show one ingredient.
///
/// GET /api/ingredients/{id}
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(_): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<IngredientView>> {
    let id: IngredientId = parse_id(&id, "ingredient")?;
    IngredientRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("ingredient not found".to_string()))
}
