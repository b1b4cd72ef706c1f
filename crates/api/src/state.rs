//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::storage::ImageStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    images: Box<dyn ImageStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `images` - Where recipe images are stored
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool, images: impl ImageStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                images: Box::new(images),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the image store.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }
}
