//! Recipe route handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use foodgram_core::RecipeId;
use foodgram_core::collection::{Collection, Toggle};
use foodgram_core::filter::RecipeQuery;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::recipe::{RecipeInput, RecipePatch};
use foodgram_core::shopping_list::SHOPPING_LIST_FILENAME;
use foodgram_core::views::RecipeView;

use super::{json_body, page_link, parse_id, query_pairs};
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::{RecipeService, shopping_list};
use crate::state::AppState;

// ============================================================================
// Listing and detail
// ============================================================================

/// List recipes, newest first.
///
/// GET /api/recipes?page&limit&is_favorited&is_in_shopping_cart&author&tags
///
/// `tags` may repeat and matches any of the given slugs. The collection
/// flags only apply to authenticated callers.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<RecipeView>>> {
    let pairs = query_pairs(raw.as_deref());
    let query = RecipeQuery::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;
    let page = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;

    let link = |n| page_link(state.config(), "api/recipes", &pairs, n);
    let recipes = RecipeService::new(&state)
        .list(&query, page, viewer, link)
        .await?;
    Ok(Json(recipes))
}

/// Show one recipe.
///
/// GET /api/recipes/{id}
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<RecipeView>> {
    let id: RecipeId = parse_id(&id, "recipe")?;
    let recipe = RecipeService::new(&state).get(id, viewer).await?;
    Ok(Json(recipe))
}

// ============================================================================
// Writes
// ============================================================================

/// Create a recipe authored by the caller.
///
/// POST /api/recipes
///
/// # Errors
///
/// Returns 400 for a malformed or invalid payload.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(author): RequireAuth,
    body: std::result::Result<Json<RecipeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeView>)> {
    let input = json_body(body)?;
    let recipe = RecipeService::new(&state).create(author, input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Partially update a recipe. Only the author may do this.
///
/// PATCH /api/recipes/{id}
///
/// # Errors
///
/// Returns 403 for anyone but the author, 404 for an unknown recipe and 400
/// for an invalid payload.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
    body: std::result::Result<Json<RecipePatch>, JsonRejection>,
) -> Result<Json<RecipeView>> {
    let id: RecipeId = parse_id(&id, "recipe")?;
    let patch = json_body(body)?;
    let recipe = RecipeService::new(&state).update(caller, id, patch).await?;
    Ok(Json(recipe))
}

/// Replace a recipe. The body must be a complete create payload.
///
/// PUT /api/recipes/{id}
///
/// # Errors
///
/// Returns 403 for anyone but the author, 404 for an unknown recipe and 400
/// for a missing field or an invalid payload.
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
    body: std::result::Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<RecipeView>> {
    let id: RecipeId = parse_id(&id, "recipe")?;
    let patch = RecipePatch::from(json_body(body)?);
    let recipe = RecipeService::new(&state).update(caller, id, patch).await?;
    Ok(Json(recipe))
}

/// Delete a recipe. Only the author may do this.
///
/// DELETE /api/recipes/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: RecipeId = parse_id(&id, "recipe")?;
    RecipeService::new(&state).delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Favorites and shopping cart
// ============================================================================

/// POST /api/recipes/{id}/favorite
pub async fn add_favorite(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<String>,
) -> Result<Response> {
    toggle_membership(state, auth, id, Collection::Favorites, Toggle::Add).await
}

/// DELETE /api/recipes/{id}/favorite
pub async fn remove_favorite(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<String>,
) -> Result<Response> {
    toggle_membership(state, auth, id, Collection::Favorites, Toggle::Remove).await
}

/// POST /api/recipes/{id}/shopping_cart
pub async fn add_to_cart(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<String>,
) -> Result<Response> {
    toggle_membership(state, auth, id, Collection::ShoppingCart, Toggle::Add).await
}

/// DELETE /api/recipes/{id}/shopping_cart
pub async fn remove_from_cart(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<String>,
) -> Result<Response> {
    toggle_membership(state, auth, id, Collection::ShoppingCart, Toggle::Remove).await
}

/// Adding answers 201 with the short recipe; removing answers 204.
async fn toggle_membership(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    collection: Collection,
    toggle: Toggle,
) -> Result<Response> {
    let id: RecipeId = parse_id(&id, "recipe")?;
    let short = RecipeService::new(&state)
        .toggle(user, id, collection, toggle)
        .await?;

    Ok(match short {
        Some(short) => (StatusCode::CREATED, Json(short)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Download the caller's shopping list as a text attachment.
///
/// GET /api/recipes/download_shopping_cart
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let body = shopping_list::render_for(state.pool(), user).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
