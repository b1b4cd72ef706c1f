//! Recipe service.

use foodgram_core::collection::{Collection, Toggle};
use foodgram_core::filter::RecipeQuery;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::recipe::{KnownIds, RecipeInput, RecipePatch};
use foodgram_core::views::{RecipeShortView, RecipeView};
use foodgram_core::{IngredientId, RecipeId, TagId, UserId};
use tracing::instrument;

use crate::db::{
    CollectionRepository, IngredientRepository, RecipeRepository, RepositoryError, TagRepository,
};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::ImageStore;

/// Recipe operations on behalf of a caller.
pub struct RecipeService<'a> {
    state: &'a AppState,
    recipes: RecipeRepository<'a>,
}

impl<'a> RecipeService<'a> {
    /// Create a new recipe service.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            recipes: RecipeRepository::new(state.pool()),
        }
    }

    fn images(&self) -> &dyn ImageStore {
        self.state.images()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One recipe as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist.
    pub async fn get(&self, id: RecipeId, viewer: Option<UserId>) -> Result<RecipeView> {
        self.recipes
            .views(&[id], viewer)
            .await?
            .pop()
            .map(|view| self.publish(view))
            .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))
    }

    /// A page of recipes matching `query`, newest first.
    ///
    /// `link` builds the absolute URL of another page of the same listing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a page past the end.
    #[instrument(skip_all, fields(page = page.page, size = page.size))]
    pub async fn list(
        &self,
        query: &RecipeQuery,
        page: PageRequest,
        viewer: Option<UserId>,
        link: impl Fn(u32) -> String,
    ) -> Result<Page<RecipeView>> {
        let predicates = query.predicates(viewer);
        let count = self.recipes.count(&predicates).await?;
        page.check_in_range(count)?;

        let ids = self
            .recipes
            .list_ids(&predicates, page.offset(), page.limit())
            .await?;
        let views = self.recipes.views(&ids, viewer).await?;

        Ok(Page::new(page, count, views, link).map(|view| self.publish(view)))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate and store a new recipe written by `author`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the payload is rejected.
    #[instrument(skip_all, fields(author = %author))]
    pub async fn create(&self, author: UserId, input: RecipeInput) -> Result<RecipeView> {
        let known = self
            .known_ids(&input.ingredient_ids(), &input.tags)
            .await?;
        let recipe = input.validate(&known)?;

        let image_path = self.images().save(&recipe.image).await?;
        let id = match self.recipes.create(author, &recipe, &image_path).await {
            Ok(id) => id,
            Err(e) => {
                self.discard_image(&image_path).await;
                return Err(e.into());
            }
        };

        self.get(id, Some(author)).await
    }

    /// Apply a partial update. Only the author may change a recipe.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist.
    /// Returns `AppError::Forbidden` if `caller` is not the author.
    /// Returns `AppError::Validation` if the patch is rejected.
    #[instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn update(
        &self,
        caller: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<RecipeView> {
        self.ensure_author(caller, id).await?;

        let known = self
            .known_ids(&patch.ingredient_ids(), patch.tags.as_deref().unwrap_or_default())
            .await?;
        let patch = patch.validate(&known)?;

        let image_path = match &patch.image {
            Some(image) => Some(self.images().save(image).await?),
            None => None,
        };

        match self.recipes.update(id, &patch, image_path.as_deref()).await {
            Ok(Some(previous)) => self.discard_image(&previous).await,
            Ok(None) => {}
            Err(e) => {
                if let Some(path) = &image_path {
                    self.discard_image(path).await;
                }
                return Err(e.into());
            }
        }

        self.get(id, Some(caller)).await
    }

    /// Delete a recipe. Only the author may delete it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the recipe does not exist.
    /// Returns `AppError::Forbidden` if `caller` is not the author.
    #[instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn delete(&self, caller: UserId, id: RecipeId) -> Result<()> {
        self.ensure_author(caller, id).await?;

        let image_path = self.recipes.delete(id).await?;
        self.discard_image(&image_path).await;
        Ok(())
    }

    /// Add a recipe to, or remove it from, one of the caller's collections.
    ///
    /// Adding returns the recipe's short view; removing returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when adding a recipe that does not exist.
    /// Returns `AppError::Conflict` when the toggle changes nothing.
    #[instrument(skip_all, fields(user = %user, recipe_id = %recipe))]
    pub async fn toggle(
        &self,
        user: UserId,
        recipe: RecipeId,
        collection: Collection,
        toggle: Toggle,
    ) -> Result<Option<RecipeShortView>> {
        let members = CollectionRepository::new(self.state.pool(), collection);

        match toggle {
            Toggle::Add => {
                let short = self
                    .recipes
                    .short(recipe)
                    .await?
                    .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))?;
                // The recipe may be deleted between the lookup and the insert.
                let added = match members.add(user, recipe).await {
                    Err(RepositoryError::NotFound) => {
                        return Err(AppError::NotFound("recipe not found".to_string()));
                    }
                    other => other?,
                };
                toggle.outcome(collection, added)?;
                Ok(Some(RecipeShortView {
                    image: self.images().url(&short.image),
                    ..short
                }))
            }
            Toggle::Remove => {
                let removed = members.remove(user, recipe).await?;
                toggle.outcome(collection, removed)?;
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn ensure_author(&self, caller: UserId, id: RecipeId) -> Result<()> {
        let author = self
            .recipes
            .author_of(id)
            .await?
            .ok_or_else(|| AppError::NotFound("recipe not found".to_string()))?;

        if author != caller {
            return Err(AppError::Forbidden(
                "only the author may change this recipe".to_string(),
            ));
        }
        Ok(())
    }

    async fn known_ids(
        &self,
        ingredients: &[IngredientId],
        tags: &[TagId],
    ) -> std::result::Result<KnownIds, RepositoryError> {
        let pool = self.state.pool();
        Ok(KnownIds {
            ingredients: IngredientRepository::new(pool)
                .existing_ids(ingredients)
                .await?,
            tags: TagRepository::new(pool).existing_ids(tags).await?,
        })
    }

    /// Swap the stored image path for its public URL.
    fn publish(&self, view: RecipeView) -> RecipeView {
        RecipeView {
            image: self.images().url(&view.image),
            ..view
        }
    }

    async fn discard_image(&self, path: &str) {
        if let Err(e) = self.images().delete(path).await {
            tracing::warn!(error = %e, path = %path, "failed to remove stored image");
        }
    }
}
