//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is `{"detail": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use foodgram_core::collection::ToggleError;
use foodgram_core::filter::FilterError;
use foodgram_core::follow::SubscriptionError;
use foodgram_core::pagination::PaginationError;
use foodgram_core::recipe::RecipeValidationError;
use foodgram_core::shopping_list::ShoppingListError;

use crate::db::RepositoryError;
use crate::storage::StorageError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Image storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request payload or parameters are invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with current state (duplicate or missing membership).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_))
            | Self::Validation(_)
            | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients.
    fn detail(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => msg.clone(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<RecipeValidationError> for AppError {
    fn from(err: RecipeValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<ToggleError> for AppError {
    fn from(err: ToggleError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::NotSubscribed => Self::Conflict(err.to_string()),
            SubscriptionError::SelfSubscription | SubscriptionError::AlreadySubscribed => {
                Self::Validation(err.to_string())
            }
        }
    }
}

impl From<ShoppingListError> for AppError {
    fn from(err: ShoppingListError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use foodgram_core::collection::Collection;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_detail(err: AppError) -> String {
        let body = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["detail"].as_str().unwrap().to_owned()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("recipe".to_string());
        assert_eq!(err.to_string(), "Not found: recipe");

        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "already subscribed".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad row".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_conversions() {
        assert_eq!(
            get_status(RecipeValidationError::CookingTimeOutOfRange(0).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(PaginationError::InvalidPage.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ToggleError::AlreadyPresent(Collection::Favorites).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SubscriptionError::SelfSubscription.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SubscriptionError::NotSubscribed.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_body_carries_detail() {
        assert_eq!(
            get_detail(ToggleError::NotPresent(Collection::ShoppingCart).into()).await,
            "recipe is not in the shopping cart"
        );
        assert_eq!(
            get_detail(SubscriptionError::AlreadySubscribed.into()).await,
            "already subscribed"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_redacted() {
        let detail = get_detail(AppError::Internal("connection string leaked".to_string())).await;
        assert_eq!(detail, "Internal server error");
    }
}
