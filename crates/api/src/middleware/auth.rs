//! Token authentication extractors.
//!
//! Callers identify themselves with `Authorization: Token <key>`, where the
//! key was issued by the identity service and lives in `auth_token`.
//!
//! - No header: anonymous.
//! - Malformed header or unknown key: 401 on every route, including the
//!   ones that allow anonymous access.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use foodgram_core::UserId;

use crate::db::TokenRepository;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Authorization scheme expected before the key.
const TOKEN_SCHEME: &str = "Token";

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, user {user}!")
/// }
/// ```
pub struct RequireAuth(pub UserId);

/// Extractor that optionally gets the caller.
///
/// Unlike `RequireAuth`, a missing header is not an error. A bad one still is.
pub struct OptionalAuth(pub Option<UserId>);

/// Resolved identity, cached in request extensions.
#[derive(Clone, Copy)]
struct ResolvedUser(Option<UserId>);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await?.map(Self).ok_or_else(|| {
            AppError::Unauthorized("authentication credentials were not provided".to_string())
        })
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await?))
    }
}

async fn resolve(parts: &mut Parts, state: &AppState) -> Result<Option<UserId>, AppError> {
    if let Some(ResolvedUser(user)) = parts.extensions.get::<ResolvedUser>() {
        return Ok(*user);
    }

    let user = match token_from_headers(&parts.headers)? {
        None => None,
        Some(key) => {
            let user = TokenRepository::new(state.pool())
                .user_for_key(key)
                .await?
                .ok_or_else(|| AppError::Unauthorized("invalid token".to_string()))?;
            set_sentry_user(&user);
            Some(user)
        }
    };

    parts.extensions.insert(ResolvedUser(user));
    Ok(user)
}

/// Extract the token key from the `Authorization` header.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for a header that is present but not of
/// the form `Token <key>`.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let invalid = || AppError::Unauthorized("invalid authorization header".to_string());
    let value = value.to_str().map_err(|_| invalid())?;
    let (scheme, key) = value.trim().split_once(' ').ok_or_else(invalid)?;
    let key = key.trim();

    if scheme != TOKEN_SCHEME || key.is_empty() || key.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(Some(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert!(token_from_headers(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_token_scheme() {
        assert_eq!(
            token_from_headers(&headers("Token 9944b09199c62bcf9418ad846dd0e4bb")).unwrap(),
            Some("9944b09199c62bcf9418ad846dd0e4bb")
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        for value in ["Bearer abc", "Token", "Token ", "Token a b", "abc"] {
            assert!(
                matches!(
                    token_from_headers(&headers(value)),
                    Err(AppError::Unauthorized(_))
                ),
                "{value:?} should be rejected"
            );
        }
    }
}
