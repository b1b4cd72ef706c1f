//! User repository for database operations.
//!
//! Accounts are created by the identity service; this repository only reads
//! them and removes them together with everything they own.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::UserId;
use foodgram_core::views::UserView;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    is_subscribed: bool,
}

impl From<UserRow> for UserView {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            is_subscribed: row.is_subscribed,
        }
    }
}

/// Columns of a `UserView`; `$2` is the viewer id (may be NULL).
const USER_VIEW_COLUMNS: &str = r"
    u.id, u.email, u.username, u.first_name, u.last_name,
    EXISTS (
        SELECT 1 FROM follow f WHERE f.user_id = $2 AND f.following_id = u.id
    ) AS is_subscribed
";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_view(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> Result<Option<UserView>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_VIEW_COLUMNS} FROM users u WHERE u.id = $1"
        ))
        .bind(id)
        .bind(viewer)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserView::from))
    }

    /// Number of users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// A page of users as seen by `viewer`, newest accounts first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_views(
        &self,
        offset: i64,
        limit: i64,
        viewer: Option<UserId>,
    ) -> Result<Vec<UserView>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r"
            SELECT {USER_VIEW_COLUMNS} FROM users u
            ORDER BY u.date_joined DESC, u.id DESC
            OFFSET $1 LIMIT $3
            "
        ))
        .bind(offset)
        .bind(viewer)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(UserView::from).collect())
    }

    /// Users with the given ids as seen by `viewer`, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn views_for(
        &self,
        ids: &[UserId],
        viewer: Option<UserId>,
    ) -> Result<HashMap<UserId, UserView>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_VIEW_COLUMNS} FROM users u WHERE u.id = ANY($1)"
        ))
        .bind(ids)
        .bind(viewer)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, UserView::from(row)))
            .collect())
    }

    /// Whether a user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// Delete a user and everything that hangs off them in one transaction:
    /// their recipes (with ingredient lines, tags and other users' favorite
    /// and cart entries pointing at them), their own collections, follow
    /// edges in both directions and auth tokens.
    ///
    /// Returns the stored image paths of the deleted recipes so the caller
    /// can remove the files.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// deleted in that case.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_with_dependents(&self, id: UserId) -> Result<Vec<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let images: Vec<String> =
            sqlx::query_scalar("SELECT image FROM recipe WHERE author_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        for statement in [
            "DELETE FROM favorite WHERE user_id = $1 OR recipe_id IN (SELECT id FROM recipe WHERE author_id = $1)",
            "DELETE FROM shopping_cart WHERE user_id = $1 OR recipe_id IN (SELECT id FROM recipe WHERE author_id = $1)",
            "DELETE FROM recipe_ingredient WHERE recipe_id IN (SELECT id FROM recipe WHERE author_id = $1)",
            "DELETE FROM recipe_tag WHERE recipe_id IN (SELECT id FROM recipe WHERE author_id = $1)",
            "DELETE FROM recipe WHERE author_id = $1",
            "DELETE FROM follow WHERE user_id = $1 OR following_id = $1",
            "DELETE FROM auth_token WHERE user_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        tracing::info!(recipes = images.len(), "user deleted");
        Ok(images)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{CollectionRepository, FollowRepository, RecipeRepository, fixtures};
    use foodgram_core::collection::Collection;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_views_newest_first_with_viewer_flag(pool: PgPool) {
        let old = fixtures::user(&pool, "old").await;
        let new = fixtures::user(&pool, "new").await;
        let viewer = fixtures::user(&pool, "viewer").await;
        sqlx::query("UPDATE users SET date_joined = now() + make_interval(days => id)")
            .execute(&pool)
            .await
            .unwrap();
        FollowRepository::new(&pool).add(viewer, old).await.unwrap();

        let users = UserRepository::new(&pool);
        assert_eq!(users.count().await.unwrap(), 3);

        let page = users.list_views(0, 2, Some(viewer)).await.unwrap();
        assert_eq!(
            page.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![viewer, new]
        );

        let rest = users.list_views(2, 2, Some(viewer)).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, old);
        assert!(rest[0].is_subscribed);

        let anonymous = users.list_views(2, 2, None).await.unwrap();
        assert!(!anonymous[0].is_subscribed);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_view(pool: PgPool) {
        let cook = fixtures::user(&pool, "cook").await;
        let users = UserRepository::new(&pool);

        let view = users.get_view(cook, None).await.unwrap().unwrap();
        assert_eq!(view.username, "cook");
        assert_eq!(view.email, "cook@example.com");
        assert!(users.get_view(UserId::new(9999), None).await.unwrap().is_none());
        assert!(users.exists(cook).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_with_dependents(pool: PgPool) {
        let cook = fixtures::user(&pool, "cook").await;
        let reader = fixtures::user(&pool, "reader").await;
        let tag = fixtures::tag(&pool, "dinner", "#8775D2").await;
        let flour = fixtures::ingredient(&pool, "flour", "g").await;
        let recipe = RecipeRepository::new(&pool)
            .create(cook, &fixtures::recipe("Bread", &[tag], &[(flour, 500)]), "recipes/b.png")
            .await
            .unwrap();
        CollectionRepository::new(&pool, Collection::Favorites)
            .add(reader, recipe)
            .await
            .unwrap();
        FollowRepository::new(&pool).add(reader, cook).await.unwrap();
        sqlx::query("INSERT INTO auth_token (key, user_id) VALUES ('k', $1)")
            .bind(cook)
            .execute(&pool)
            .await
            .unwrap();

        let users = UserRepository::new(&pool);
        let images = users.delete_with_dependents(cook).await.unwrap();

        assert_eq!(images, vec!["recipes/b.png".to_owned()]);
        for table in ["recipe", "recipe_tag", "recipe_ingredient", "favorite", "follow", "auth_token"] {
            assert_eq!(fixtures::count_rows(&pool, table).await, 0, "{table}");
        }
        assert!(users.exists(reader).await.unwrap());
        assert!(matches!(
            users.delete_with_dependents(cook).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
