//! Subscription service.

use foodgram_core::UserId;
use foodgram_core::follow::{SubscriptionError, check_subscribe, check_unsubscribe};
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::views::SubscriptionView;
use tracing::instrument;

use crate::db::{FollowRepository, RecipeRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Follow operations on behalf of a caller.
pub struct SubscriptionService<'a> {
    state: &'a AppState,
    follows: FollowRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> SubscriptionService<'a> {
    /// Create a new subscription service.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            follows: FollowRepository::new(state.pool()),
            users: UserRepository::new(state.pool()),
        }
    }

    /// Start following `author`. Returns the author with a preview of their
    /// recipes, capped at `recipes_limit` when given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the author does not exist.
    /// Returns `AppError::Validation` for a self-follow or a duplicate.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn subscribe(
        &self,
        follower: UserId,
        author: UserId,
        recipes_limit: Option<i64>,
    ) -> Result<SubscriptionView> {
        if !self.users.exists(author).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        let following = self.follows.is_following(follower, author).await?;
        check_subscribe(follower, author, following)?;

        // A concurrent subscribe can still win the race to the unique index.
        match self.follows.add(follower, author).await {
            Err(RepositoryError::Conflict(_)) => {
                return Err(SubscriptionError::AlreadySubscribed.into());
            }
            other => other?,
        }

        self.assemble(&[author], follower, recipes_limit)
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// Stop following `author`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the author does not exist.
    /// Returns `AppError::Conflict` if `follower` was not following them.
    #[instrument(skip_all, fields(follower = %follower, author = %author))]
    pub async fn unsubscribe(&self, follower: UserId, author: UserId) -> Result<()> {
        if !self.users.exists(author).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        let removed = self.follows.remove(follower, author).await?;
        check_unsubscribe(removed)?;
        Ok(())
    }

    /// A page of the authors `follower` follows, oldest subscription first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a page past the end.
    #[instrument(skip_all, fields(follower = %follower, page = page.page))]
    pub async fn list(
        &self,
        follower: UserId,
        page: PageRequest,
        recipes_limit: Option<i64>,
        link: impl Fn(u32) -> String,
    ) -> Result<Page<SubscriptionView>> {
        let count = self.follows.count_following(follower).await?;
        page.check_in_range(count)?;

        let authors = self
            .follows
            .following(follower, page.offset(), page.limit())
            .await?;
        let results = self.assemble(&authors, follower, recipes_limit).await?;

        Ok(Page::new(page, count, results, link))
    }

    /// Subscription views for `authors`, in the given order.
    async fn assemble(
        &self,
        authors: &[UserId],
        viewer: UserId,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<SubscriptionView>> {
        let mut users = self.users.views_for(authors, Some(viewer)).await?;
        let mut recipes = RecipeRepository::new(self.state.pool())
            .by_authors(authors, recipes_limit)
            .await?;
        let images = self.state.images();

        Ok(authors
            .iter()
            .filter_map(|id| {
                let user = users.remove(id)?;
                let preview = recipes.remove(id).unwrap_or_default();
                let shorts = preview
                    .recipes
                    .into_iter()
                    .map(|mut short| {
                        short.image = images.url(&short.image);
                        short
                    })
                    .collect();
                Some(SubscriptionView::new(user, shorts, preview.count))
            })
            .collect())
    }
}
