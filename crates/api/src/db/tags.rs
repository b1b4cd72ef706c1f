//! Tag repository.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::instrument;

use foodgram_core::views::TagView;
use foodgram_core::{HexColor, RecipeId, Slug, TagId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: TagId,
    name: String,
    color: String,
    slug: String,
}

impl TryFrom<TagRow> for TagView {
    type Error = RepositoryError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: slug.into_inner(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecipeTagRow {
    recipe_id: RecipeId,
    #[sqlx(flatten)]
    tag: TagRow,
}

/// Repository for tag database operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All tags ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<TagView>, RepositoryError> {
        let rows: Vec<TagRow> =
            sqlx::query_as("SELECT id, name, color, slug FROM tag ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TagView::try_from).collect()
    }

    /// Get a tag by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TagId) -> Result<Option<TagView>, RepositoryError> {
        let row: Option<TagRow> =
            sqlx::query_as("SELECT id, name, color, slug FROM tag WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(TagView::try_from).transpose()
    }

    /// Which of `ids` exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_ids(&self, ids: &[TagId]) -> Result<HashSet<TagId>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<(TagId,)> = sqlx::query_as("SELECT id FROM tag WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Tags of each recipe, ordered by tag id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, recipes), fields(recipes = recipes.len()))]
    pub async fn for_recipes(
        &self,
        recipes: &[RecipeId],
    ) -> Result<HashMap<RecipeId, Vec<TagView>>, RepositoryError> {
        let rows: Vec<RecipeTagRow> = sqlx::query_as(
            r"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tag rt
            JOIN tag t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            ",
        )
        .bind(recipes)
        .fetch_all(self.pool)
        .await?;

        let mut by_recipe: HashMap<RecipeId, Vec<TagView>> = HashMap::new();
        for row in rows {
            by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(TagView::try_from(row.tag)?);
        }
        Ok(by_recipe)
    }

    /// Insert a tag unless one with the same slug exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or color collides with
    /// a tag under another slug.
    pub async fn insert_if_absent(
        &self,
        name: &str,
        color: &HexColor,
        slug: &Slug,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO tag (name, color, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(name)
        .bind(color.as_str())
        .bind(slug.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| super::conflict_on_unique(e, "tag name or color already used"))?;

        Ok(result.rows_affected() == 1)
    }
}
