//! Application state shared across handlers.

use std::sync::Arc;

use solestyle_core::{MemoryStorage, Storage, StorageError};

use crate::config::StorefrontConfig;
use crate::middleware::VisitorId;
use crate::services::VisitorStore;
use crate::storage::FileStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the persistent store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Box<dyn Storage>,
}

impl AppState {
    /// Create application state around an existing storage backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: impl Storage + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage: Box::new(storage),
            }),
        }
    }

    /// Create application state with the backend the configuration asks
    /// for: files under `data_dir`, or memory when it is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StorageError> {
        match config.data_dir.clone() {
            Some(dir) => {
                let storage = FileStorage::open(&dir)?;
                tracing::info!(data_dir = %dir.display(), "Using file storage");
                Ok(Self::new(config, storage))
            }
            None => {
                tracing::warn!("STOREFRONT_DATA_DIR not set; carts and orders are kept in memory");
                Ok(Self::new(config, MemoryStorage::new()))
            }
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    /// Persistent storage of one visitor.
    #[must_use]
    pub fn visitor_store(&self, visitor: &VisitorId) -> VisitorStore<'_> {
        VisitorStore::new(self.storage(), visitor.as_str())
    }
}
