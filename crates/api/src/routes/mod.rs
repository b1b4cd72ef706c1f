//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (database)
//!
//! # Catalog
//! GET  /api/tags                            - Tag list
//! GET  /api/tags/{id}                       - Tag detail
//! GET  /api/ingredients?name=               - Ingredient search
//! GET  /api/ingredients/{id}                - Ingredient detail
//!
//! # Recipes
//! GET    /api/recipes                       - Filtered, paginated list
//! POST   /api/recipes                       - Create (auth)
//! GET    /api/recipes/download_shopping_cart - Shopping list (auth)
//! GET    /api/recipes/{id}                  - Detail
//! PUT    /api/recipes/{id}                  - Replace (author)
//! PATCH  /api/recipes/{id}                  - Update (author)
//! DELETE /api/recipes/{id}                  - Delete (author)
//! POST   /api/recipes/{id}/favorite         - Add to favorites (auth)
//! DELETE /api/recipes/{id}/favorite         - Remove from favorites (auth)
//! POST   /api/recipes/{id}/shopping_cart    - Add to cart (auth)
//! DELETE /api/recipes/{id}/shopping_cart    - Remove from cart (auth)
//!
//! # Users
//! GET    /api/users                         - Paginated user list
//! GET    /api/users/me                      - Caller profile (auth)
//! GET    /api/users/subscriptions           - Followed authors (auth)
//! GET    /api/users/{id}                    - Profile
//! POST   /api/users/{id}/subscribe          - Follow (auth)
//! DELETE /api/users/{id}/subscribe          - Unfollow (auth)
//! ```

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use url::form_urlencoded;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the tag routes router.
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::index))
        .route("/{id}", get(tags::show))
}

/// Create the ingredient routes router.
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ingredients::index))
        .route("/{id}", get(ingredients::show))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::index).post(recipes::create))
        .route(
            "/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(recipes::show)
                .put(recipes::replace)
                .patch(recipes::update)
                .delete(recipes::destroy),
        )
        .route(
            "/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/me", get(users::me))
        .route("/subscriptions", get(users::subscriptions))
        .route("/{id}", get(users::show))
        .route(
            "/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
}

/// Create all routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/tags", tag_routes())
        .nest("/ingredients", ingredient_routes())
        .nest("/recipes", recipe_routes())
        .nest("/users", user_routes())
}

// =============================================================================
// Health
// =============================================================================

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("not found".to_string())
}

// =============================================================================
// Request helpers
// =============================================================================

/// Decoded query-string pairs, in order. Keys may repeat.
pub(crate) fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Parse a path segment into an id. Anything unparseable cannot name an
/// existing row, so it is reported as missing.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

/// Unwrap a JSON body, reporting malformed payloads as validation errors.
pub(crate) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Parse `recipes_limit`. Absent or empty means no cap.
pub(crate) fn recipes_limit(pairs: &[(String, String)]) -> Result<Option<i64>> {
    let Some((_, raw)) = pairs.iter().rev().find(|(key, _)| key == "recipes_limit") else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<i64>() {
        Ok(limit) if limit >= 0 => Ok(Some(limit)),
        _ => Err(AppError::Validation(format!(
            "recipes_limit must be a non-negative integer, got {raw:?}"
        ))),
    }
}

/// Absolute URL of another page of a listing, keeping every other query
/// parameter as it was.
pub(crate) fn page_link(
    config: &ApiConfig,
    path: &str,
    pairs: &[(String, String)],
    page: u32,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs.iter().filter(|(key, _)| key != "page") {
        query.append_pair(key, value);
    }
    query.append_pair("page", &page.to_string());

    format!("{}?{}", config.absolute_url(path), query.finish())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use foodgram_core::RecipeId;
    use secrecy::SecretString;
    use url::Url;

    fn config() -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/foodgram".to_string()),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: Url::parse("https://food.example.com/").unwrap(),
            media_root: "media".into(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_query_pairs_keeps_repeats() {
        let pairs = query_pairs(Some("tags=lunch&tags=dinner&name=%D1%82%D0%BE%D0%BC%D0%B0"));
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], ("tags".to_string(), "lunch".to_string()));
        assert_eq!(pairs[1].1, "dinner");
        assert_eq!(pairs[2].1, "тома");
        assert!(query_pairs(None).is_empty());
    }

    #[test]
    fn test_parse_id() {
        let id: RecipeId = parse_id("42", "recipe").unwrap();
        assert_eq!(id, RecipeId::new(42));

        let err = parse_id::<RecipeId>("forty-two", "recipe").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "recipe not found"));
    }

    #[test]
    fn test_recipes_limit() {
        let pairs = |v: &str| vec![("recipes_limit".to_string(), v.to_string())];

        assert_eq!(recipes_limit(&[]).unwrap(), None);
        assert_eq!(recipes_limit(&pairs("")).unwrap(), None);
        assert_eq!(recipes_limit(&pairs("3")).unwrap(), Some(3));
        assert_eq!(recipes_limit(&pairs("0")).unwrap(), Some(0));
        assert!(matches!(
            recipes_limit(&pairs("-1")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            recipes_limit(&pairs("many")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_page_link_replaces_page() {
        let pairs = query_pairs(Some("page=2&tags=lunch&limit=3"));
        let link = page_link(&config(), "api/recipes", &pairs, 3);
        assert_eq!(
            link,
            "https://food.example.com/api/recipes?tags=lunch&limit=3&page=3"
        );
    }
}
