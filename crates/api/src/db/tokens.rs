//! Auth token lookup.
//!
//! Tokens are issued by the identity service; we only resolve them.

use sqlx::PgPool;

use foodgram_core::UserId;

use super::RepositoryError;

/// Repository for auth token lookups.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a token key to its user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_for_key(&self, key: &str) -> Result<Option<UserId>, RepositoryError> {
        let user_id: Option<UserId> =
            sqlx::query_scalar("SELECT user_id FROM auth_token WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        Ok(user_id)
    }
}
