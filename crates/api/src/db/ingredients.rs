//! Ingredient catalog repository.

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use foodgram_core::IngredientId;
use foodgram_core::search::{IngredientSearch, NamePredicate};
use foodgram_core::views::IngredientView;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: IngredientId,
    name: String,
    measurement_unit: String,
}

impl From<IngredientRow> for IngredientView {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

/// Repository for ingredient database operations.
pub struct IngredientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IngredientRepository<'a> {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ingredients matching `search`, prefix matches first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, search), fields(terms = search.terms().count()))]
    pub async fn search(
        &self,
        search: &IngredientSearch,
    ) -> Result<Vec<IngredientView>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, name, measurement_unit FROM ingredient");

        if search.is_pass_through() {
            query.push(" ORDER BY name, id");
        } else {
            query.push(" WHERE ");
            let mut any = query.separated(" OR ");
            for predicate in search.predicates() {
                any.push("name ILIKE ");
                any.push_bind_unseparated(predicate.like_pattern());
            }

            query.push(" ORDER BY CASE WHEN ");
            let mut prefix = query.separated(" OR ");
            for predicate in search
                .predicates()
                .iter()
                .filter(|p| matches!(p, NamePredicate::StartsWith(_)))
            {
                prefix.push("name ILIKE ");
                prefix.push_bind_unseparated(predicate.like_pattern());
            }
            query.push(" THEN 0 ELSE 1 END, name, id");
        }

        let rows = query
            .build_query_as::<IngredientRow>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(IngredientView::from).collect())
    }

    /// Get an ingredient by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: IngredientId) -> Result<Option<IngredientView>, RepositoryError> {
        let row: Option<IngredientRow> =
            sqlx::query_as("SELECT id, name, measurement_unit FROM ingredient WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(IngredientView::from))
    }

    /// Which of `ids` exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashSet<IngredientId>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<(IngredientId,)> =
            sqlx::query_as("SELECT id FROM ingredient WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Insert an ingredient unless the same name and unit already exist.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_absent(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO ingredient (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    async fn names(pool: &PgPool, raw: Option<&str>) -> Vec<String> {
        IngredientRepository::new(pool)
            .search(&IngredientSearch::parse(raw))
            .await
            .unwrap()
            .into_iter()
            .map(|ingredient| ingredient.name)
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_prefix_matches_first(pool: PgPool) {
        for name in ["Соус томатный", "Кетчуп", "Томат"] {
            fixtures::ingredient(&pool, name, "г").await;
        }

        assert_eq!(names(&pool, Some("тома")).await, vec!["Томат", "Соус томатный"]);
        assert_eq!(names(&pool, None).await, vec!["Кетчуп", "Соус томатный", "Томат"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_treats_wildcards_literally(pool: PgPool) {
        fixtures::ingredient(&pool, "sugar", "g").await;
        fixtures::ingredient(&pool, "100% juice", "ml").await;

        assert_eq!(names(&pool, Some("%")).await, vec!["100% juice"]);
        assert!(names(&pool, Some("_ugar")).await.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_if_absent(pool: PgPool) {
        let repo = IngredientRepository::new(&pool);
        assert!(repo.insert_if_absent("salt", "g").await.unwrap());
        assert!(!repo.insert_if_absent("salt", "g").await.unwrap());
        assert!(repo.insert_if_absent("salt", "pinch").await.unwrap());
    }
}
