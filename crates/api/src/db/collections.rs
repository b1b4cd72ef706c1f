//! Favorites and shopping cart membership.
//!
//! Both collections share one table shape, `(id, user_id, recipe_id)` with a
//! unique `(user_id, recipe_id)` pair, so a single repository serves both.

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::collection::Collection;
use foodgram_core::{RecipeId, UserId};

use super::RepositoryError;

/// Repository for per-user recipe collections.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
    collection: Collection,
}

impl<'a> CollectionRepository<'a> {
    /// Create a repository over one collection.
    #[must_use]
    pub const fn new(pool: &'a PgPool, collection: Collection) -> Self {
        Self { pool, collection }
    }

    /// Add a recipe. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe or user is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn add(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT (user_id, recipe_id) DO NOTHING",
            self.collection.table()
        );
        let result = sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await
            .map_err(super::missing_on_foreign_key)?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a recipe. Returns `false` if it was not present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn remove(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            self.collection.table()
        );
        let result = sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Recipes in the user's collection, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recipes_of(&self, user: UserId) -> Result<Vec<RecipeId>, RepositoryError> {
        let sql = format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 ORDER BY id",
            self.collection.table()
        );
        let ids: Vec<RecipeId> = sqlx::query_scalar(&sql)
            .bind(user)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }
}
