//! Recipe aggregate repository.
//!
//! A recipe is one `recipe` row plus its ingredient lines and tag links.
//! Writes touch all three tables inside one transaction. Reads are batched:
//! the list endpoint fetches a page of ids first, then loads every view for
//! that page with a fixed number of queries.
//!
//! The `image` column stores the path returned by the image store; turning
//! it into a public URL is left to the caller.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use foodgram_core::filter::RecipePredicate;
use foodgram_core::recipe::{IngredientAmount, ValidatedPatch, ValidatedRecipe};
use foodgram_core::views::{RecipeIngredientView, RecipeShortView, RecipeView};
use foodgram_core::{IngredientId, RecipeId, TagId, UserId};

use super::{RepositoryError, TagRepository, UserRepository};

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    author_id: UserId,
    name: String,
    text: String,
    cooking_time: i32,
    image: String,
    is_favorited: bool,
    is_in_shopping_cart: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientLineRow {
    recipe_id: RecipeId,
    id: IngredientId,
    name: String,
    measurement_unit: String,
    amount: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ShortRow {
    id: RecipeId,
    name: String,
    image: String,
    cooking_time: i32,
}

impl From<ShortRow> for RecipeShortView {
    fn from(row: ShortRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image,
            cooking_time: row.cooking_time,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuthorRecipeRow {
    author_id: UserId,
    #[sqlx(flatten)]
    recipe: ShortRow,
}

/// Recipes of one author: a preview and the total count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecipes {
    pub recipes: Vec<RecipeShortView>,
    pub count: i64,
}

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Author of a recipe, or `None` if the recipe does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn author_of(&self, id: RecipeId) -> Result<Option<UserId>, RepositoryError> {
        let author: Option<UserId> =
            sqlx::query_scalar("SELECT author_id FROM recipe WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(author)
    }

    /// Short representation of a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn short(&self, id: RecipeId) -> Result<Option<RecipeShortView>, RepositoryError> {
        let row: Option<ShortRow> =
            sqlx::query_as("SELECT id, name, image, cooking_time FROM recipe WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(RecipeShortView::from))
    }

    /// Number of recipes matching every predicate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, predicates: &[RecipePredicate]) -> Result<i64, RepositoryError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM recipe r");
        push_filters(&mut query, predicates);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Ids of matching recipes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, predicates), fields(filters = predicates.len()))]
    pub async fn list_ids(
        &self,
        predicates: &[RecipePredicate],
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RecipeId>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT r.id FROM recipe r");
        push_filters(&mut query, predicates);
        query.push(" ORDER BY r.pub_date DESC, r.id DESC OFFSET ");
        query.push_bind(offset);
        query.push(" LIMIT ");
        query.push_bind(limit);

        let ids = query
            .build_query_scalar::<RecipeId>()
            .fetch_all(self.pool)
            .await?;
        Ok(ids)
    }

    /// Full views of `ids` as seen by `viewer`, in the order given. Ids that
    /// do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a recipe's author is missing.
    #[instrument(skip(self, ids), fields(recipes = ids.len()))]
    pub async fn views(
        &self,
        ids: &[RecipeId],
        viewer: Option<UserId>,
    ) -> Result<Vec<RecipeView>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<RecipeRow> = sqlx::query_as(
            r"
            SELECT r.id, r.author_id, r.name, r.text, r.cooking_time, r.image,
                   EXISTS (
                       SELECT 1 FROM favorite f WHERE f.recipe_id = r.id AND f.user_id = $2
                   ) AS is_favorited,
                   EXISTS (
                       SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = $2
                   ) AS is_in_shopping_cart
            FROM recipe r
            WHERE r.id = ANY($1)
            ",
        )
        .bind(ids)
        .bind(viewer)
        .fetch_all(self.pool)
        .await?;

        let author_ids: Vec<UserId> = rows.iter().map(|row| row.author_id).collect();
        let authors = UserRepository::new(self.pool)
            .views_for(&author_ids, viewer)
            .await?;
        let mut tags = TagRepository::new(self.pool).for_recipes(ids).await?;
        let mut lines = self.ingredient_lines(ids).await?;

        let mut by_id: HashMap<RecipeId, RecipeView> = HashMap::with_capacity(rows.len());
        for row in rows {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "recipe {} references missing author {}",
                        row.id, row.author_id
                    ))
                })?;
            by_id.insert(
                row.id,
                RecipeView {
                    id: row.id,
                    tags: tags.remove(&row.id).unwrap_or_default(),
                    author,
                    ingredients: lines.remove(&row.id).unwrap_or_default(),
                    is_favorited: row.is_favorited,
                    is_in_shopping_cart: row.is_in_shopping_cart,
                    name: row.name,
                    image: row.image,
                    text: row.text,
                    cooking_time: row.cooking_time,
                },
            );
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Ingredient lines of each recipe, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ingredient_lines(
        &self,
        recipes: &[RecipeId],
    ) -> Result<HashMap<RecipeId, Vec<RecipeIngredientView>>, RepositoryError> {
        if recipes.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<IngredientLineRow> = sqlx::query_as(
            r"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredient ri
            JOIN ingredient i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            ",
        )
        .bind(recipes)
        .fetch_all(self.pool)
        .await?;

        let mut by_recipe: HashMap<RecipeId, Vec<RecipeIngredientView>> = HashMap::new();
        for row in rows {
            by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredientView {
                    id: row.id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }
        Ok(by_recipe)
    }

    /// Newest recipes of each author, capped at `limit` per author, plus each
    /// author's total. The total ignores the cap. Authors without recipes
    /// are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn by_authors(
        &self,
        authors: &[UserId],
        limit: Option<i64>,
    ) -> Result<HashMap<UserId, AuthorRecipes>, RepositoryError> {
        if authors.is_empty() {
            return Ok(HashMap::new());
        }

        let totals: Vec<(UserId, i64)> = sqlx::query_as(
            r"
            SELECT author_id, COUNT(*)
            FROM recipe
            WHERE author_id = ANY($1)
            GROUP BY author_id
            ",
        )
        .bind(authors)
        .fetch_all(self.pool)
        .await?;

        let mut by_author: HashMap<UserId, AuthorRecipes> = totals
            .into_iter()
            .map(|(author, count)| {
                (
                    author,
                    AuthorRecipes {
                        recipes: Vec::new(),
                        count,
                    },
                )
            })
            .collect();

        if limit == Some(0) {
            return Ok(by_author);
        }

        let rows: Vec<AuthorRecipeRow> = sqlx::query_as(
            r"
            SELECT author_id, id, name, image, cooking_time
            FROM (
                SELECT r.author_id, r.id, r.name, r.image, r.cooking_time,
                       ROW_NUMBER() OVER (
                           PARTITION BY r.author_id ORDER BY r.pub_date DESC, r.id DESC
                       ) AS position
                FROM recipe r
                WHERE r.author_id = ANY($1)
            ) ranked
            WHERE $2::BIGINT IS NULL OR position <= $2
            ORDER BY author_id, position
            ",
        )
        .bind(authors)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        for row in rows {
            if let Some(entry) = by_author.get_mut(&row.author_id) {
                entry.recipes.push(RecipeShortView::from(row.recipe));
            }
        }
        Ok(by_author)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a recipe with its tags and ingredient lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    #[instrument(skip(self, recipe, image_path), fields(author = %author))]
    pub async fn create(
        &self,
        author: UserId,
        recipe: &ValidatedRecipe,
        image_path: &str,
    ) -> Result<RecipeId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: RecipeId = sqlx::query_scalar(
            r"
            INSERT INTO recipe (author_id, name, text, cooking_time, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(author)
        .bind(&recipe.name)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(image_path)
        .fetch_one(&mut *tx)
        .await?;

        insert_tags(&mut tx, id, &recipe.tags).await?;
        insert_ingredient_lines(&mut tx, id, &recipe.ingredients).await?;

        tx.commit().await?;
        tracing::info!(recipe_id = %id, "recipe created");
        Ok(id)
    }

    /// Apply a partial update. Supplied tag and ingredient lists replace the
    /// stored sets.
    ///
    /// Returns the previous image path when `image_path` replaced it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    #[instrument(skip(self, patch, image_path), fields(recipe_id = %id))]
    pub async fn update(
        &self,
        id: RecipeId,
        patch: &ValidatedPatch,
        image_path: Option<&str>,
    ) -> Result<Option<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous_image: Option<String> =
            sqlx::query_scalar("SELECT image FROM recipe WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous_image) = previous_image else {
            return Err(RepositoryError::NotFound);
        };

        if patch.touches_row() {
            sqlx::query(
                r"
                UPDATE recipe SET
                    name = COALESCE($2, name),
                    text = COALESCE($3, text),
                    cooking_time = COALESCE($4, cooking_time),
                    image = COALESCE($5, image)
                WHERE id = $1
                ",
            )
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.text.as_deref())
            .bind(patch.cooking_time)
            .bind(image_path)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(tags) = &patch.tags {
            sqlx::query("DELETE FROM recipe_tag WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_tags(&mut tx, id, tags).await?;
        }

        if let Some(lines) = &patch.ingredients {
            sqlx::query("DELETE FROM recipe_ingredient WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_ingredient_lines(&mut tx, id, lines).await?;
        }

        tx.commit().await?;
        Ok(image_path.map(|_| previous_image))
    }

    /// Delete a recipe together with its lines, tags and every favorite and
    /// cart entry pointing at it.
    ///
    /// Returns the stored image path so the caller can remove the file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// deleted in that case.
    #[instrument(skip(self), fields(recipe_id = %id))]
    pub async fn delete(&self, id: RecipeId) -> Result<String, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM favorite WHERE recipe_id = $1",
            "DELETE FROM shopping_cart WHERE recipe_id = $1",
            "DELETE FROM recipe_ingredient WHERE recipe_id = $1",
            "DELETE FROM recipe_tag WHERE recipe_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        let image: Option<String> =
            sqlx::query_scalar("DELETE FROM recipe WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(image) = image else {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;
        tracing::info!("recipe deleted");
        Ok(image)
    }
}

/// Append a `WHERE` clause for `predicates` (AND-ed) to a query over `recipe r`.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, predicates: &[RecipePredicate]) {
    if predicates.is_empty() {
        return;
    }

    query.push(" WHERE ");
    let mut all = query.separated(" AND ");
    for predicate in predicates {
        match predicate {
            RecipePredicate::FavoritedBy(user) => {
                all.push("EXISTS (SELECT 1 FROM favorite f WHERE f.recipe_id = r.id AND f.user_id = ");
                all.push_bind_unseparated(*user);
                all.push_unseparated(")");
            }
            RecipePredicate::InCartOf(user) => {
                all.push(
                    "EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ",
                );
                all.push_bind_unseparated(*user);
                all.push_unseparated(")");
            }
            RecipePredicate::AuthoredBy(author) => {
                all.push("r.author_id = ");
                all.push_bind_unseparated(*author);
            }
            RecipePredicate::TaggedAny(slugs) => {
                all.push(
                    "EXISTS (SELECT 1 FROM recipe_tag rt JOIN tag t ON t.id = rt.tag_id \
                     WHERE rt.recipe_id = r.id AND t.slug = ANY(",
                );
                all.push_bind_unseparated(slugs.clone());
                all.push_unseparated("))");
            }
        }
    }
}

async fn insert_tags(
    conn: &mut PgConnection,
    recipe: RecipeId,
    tags: &[TagId],
) -> Result<(), RepositoryError> {
    if tags.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tag (recipe_id, tag_id) ");
    query.push_values(tags, |mut row, tag| {
        row.push_bind(recipe).push_bind(*tag);
    });
    query
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| super::conflict_on_unique(e, "tags must not repeat"))?;

    Ok(())
}

async fn insert_ingredient_lines(
    conn: &mut PgConnection,
    recipe: RecipeId,
    lines: &[IngredientAmount],
) -> Result<(), RepositoryError> {
    if lines.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredient (recipe_id, ingredient_id, amount) ");
    query.push_values(lines, |mut row, line| {
        row.push_bind(recipe)
            .push_bind(line.id)
            .push_bind(line.amount);
    });
    query
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| super::conflict_on_unique(e, "ingredients must not repeat"))?;

    Ok(())
}
