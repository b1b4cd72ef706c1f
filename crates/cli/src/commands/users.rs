//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! foodgram users delete 42
//! ```
//!
//! # Environment Variables
//!
//! - `FOODGRAM_DATABASE_URL` - `PostgreSQL` connection string
//! - `FOODGRAM_MEDIA_ROOT` - Where recipe images are stored

use foodgram_api::db::UserRepository;
use foodgram_api::storage::{ImageStore, LocalImageStore};
use foodgram_core::UserId;

use super::{CommandError, connect};

/// Delete a user with their recipes, collections, follow edges and tokens,
/// then remove the images of the deleted recipes.
///
/// Image removal is best effort: the rows are already gone, so a file that
/// cannot be removed is logged and skipped.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the user does not exist or the
/// delete fails.
pub async fn delete(id: i32) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let user = UserId::new(id);

    tracing::info!("Deleting user {}", user);
    let images = UserRepository::new(&pool).delete_with_dependents(user).await?;

    let store = LocalImageStore::new(&config.media_root, config.base_url.as_str());
    let mut removed = 0_usize;
    for path in &images {
        match store.delete(path).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(error = %e, path = %path, "Failed to remove image"),
        }
    }

    tracing::info!(
        user_id = %user,
        recipes = images.len(),
        images_removed = removed,
        "User deleted"
    );
    Ok(())
}
