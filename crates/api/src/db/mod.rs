//! Database operations for Foodgram `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users`, `auth_token` - Mirrored from the identity service
//! - `ingredient`, `tag` - Reference catalog
//! - `recipe`, `recipe_ingredient`, `recipe_tag` - Recipe aggregate
//! - `favorite`, `shopping_cart` - Per-user recipe collections
//! - `follow` - Follow graph
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p foodgram-cli -- migrate
//! ```

pub mod collections;
pub mod follows;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod tokens;
pub mod users;

#[cfg(test)]
mod fixtures;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use collections::CollectionRepository;
pub use follows::FollowRepository;
pub use ingredients::IngredientRepository;
pub use recipes::RecipeRepository;
pub use tags::TagRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate favorite).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Map a foreign-key violation to `NotFound`, anything else to `Database`.
pub(crate) fn missing_on_foreign_key(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that connects on first use.
///
/// Used by tests that exercise routes which never reach the database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy(database_url.expose_secret())
}
