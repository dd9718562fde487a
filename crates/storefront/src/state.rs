//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CommerceError, StoreClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds only immutable
/// resources: configuration and the Store API client. Nothing fetched for one
/// request is kept for another.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: StoreClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Store API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CommerceError> {
        let store = StoreClient::new(&config.medusa)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, store }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Medusa Store API client.
    #[must_use]
    pub fn store(&self) -> &StoreClient {
        &self.inner.store
    }
}
