//! Follow graph repository.

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::UserId;

use super::RepositoryError;

/// Repository for follow edges.
pub struct FollowRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FollowRepository<'a> {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether `follower` follows `author`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_following(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follow WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(follower)
        .bind(author)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create an edge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the edge already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn add(&self, follower: UserId, author: UserId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO follow (user_id, following_id) VALUES ($1, $2)")
            .bind(follower)
            .bind(author)
            .execute(self.pool)
            .await
            .map_err(|e| super::conflict_on_unique(e, "already subscribed"))?;

        Ok(())
    }

    /// Remove an edge. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn remove(&self, follower: UserId, author: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM follow WHERE user_id = $1 AND following_id = $2")
            .bind(follower)
            .bind(author)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of users `follower` follows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_following(&self, follower: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follow WHERE user_id = $1")
            .bind(follower)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// A page of followed users, in the order the edges were created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn following(
        &self,
        follower: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserId>, RepositoryError> {
        let ids: Vec<UserId> = sqlx::query_scalar(
            r"
            SELECT following_id FROM follow
            WHERE user_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            ",
        )
        .bind(follower)
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }
}
