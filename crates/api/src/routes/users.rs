//! User profile and subscription route handlers.
//!
//! Registration, passwords and token issuance belong to the identity
//! service. This module only reads profiles and manages follow edges.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};

use foodgram_core::UserId;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::views::{SubscriptionView, UserView};

use super::{page_link, parse_id, query_pairs, recipes_limit};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::SubscriptionService;
use crate::state::AppState;

/// Every user as seen by the caller, newest accounts first.
///
/// GET /api/users?page&limit
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UserView>>> {
    let pairs = query_pairs(raw.as_deref());
    let page = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;

    let users = UserRepository::new(state.pool());
    let count = users.count().await?;
    page.check_in_range(count)?;
    let results = users
        .list_views(page.offset(), page.limit(), viewer)
        .await?;

    let link = |n| page_link(state.config(), "api/users", &pairs, n);
    Ok(Json(Page::new(page, count, results, link)))
}

/// The caller's own profile.
///
/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserView>> {
    profile(&state, user, Some(user)).await.map(Json)
}

/// A user's profile as seen by the caller.
///
/// GET /api/users/{id}
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    let id: UserId = parse_id(&id, "user")?;
    profile(&state, id, viewer).await.map(Json)
}

async fn profile(state: &AppState, id: UserId, viewer: Option<UserId>) -> Result<UserView> {
    UserRepository::new(state.pool())
        .get_view(id, viewer)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

/// Authors the caller follows, each with a preview of their recipes.
///
/// GET /api/users/subscriptions?page&limit&recipes_limit
pub async fn subscriptions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<SubscriptionView>>> {
    let pairs = query_pairs(raw.as_deref());
    let page = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;
    let limit = recipes_limit(&pairs)?;

    let link = |n| page_link(state.config(), "api/users/subscriptions", &pairs, n);
    let authors = SubscriptionService::new(&state)
        .list(user, page, limit, link)
        .await?;
    Ok(Json(authors))
}

/// Follow an author.
///
/// POST /api/users/{id}/subscribe?recipes_limit
///
/// # Errors
///
/// Returns 400 for a self-follow or an existing subscription, 404 for an
/// unknown author.
pub async fn subscribe(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<(StatusCode, Json<SubscriptionView>)> {
    let author: UserId = parse_id(&id, "user")?;
    let limit = recipes_limit(&query_pairs(raw.as_deref()))?;

    let view = SubscriptionService::new(&state)
        .subscribe(user, author, limit)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Stop following an author.
///
/// DELETE /api/users/{id}/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let author: UserId = parse_id(&id, "user")?;
    SubscriptionService::new(&state)
        .unsubscribe(user, author)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
