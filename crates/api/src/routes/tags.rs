//! Tag route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use foodgram_core::TagId;
use foodgram_core::views::TagView;

use super::parse_id;
use crate::db::TagRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// List every tag.
///
/// GET /api/tags
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(_): OptionalAuth,
) -> Result<Json<Vec<TagView>>> {
    let tags = TagRepository::new(state.pool()).list().await?;
    Ok(Json(tags))
}

/// Show one tag.
///
/// GET /api/tags/{id}
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(_): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<TagView>> {
    let id: TagId = parse_id(&id, "tag")?;
    TagRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("tag not found".to_string()))
}
