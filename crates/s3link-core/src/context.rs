// SPDX-License-Identifier: AGPL-3.0
// S3Link Core - Shared context
//
// Everything a session needs is passed in through `AppContext` rather than
// reached through globals, so several independent sessions can coexist.

use crate::config::SessionConfig;
use crate::i18n::Catalog;
use crate::notify::NotificationQueue;
use crate::store::CredentialStore;
use crate::types::{AppError, DisplayMode};
use std::sync::Arc;

/// Store, notification queue and text catalog shared by one client
#[derive(Clone)]
pub struct AppContext {
    config: Arc<SessionConfig>,
    store: Arc<CredentialStore>,
    notifications: NotificationQueue,
    catalog: Arc<Catalog>,
}

impl AppContext {
    /// Build a context with the built-in catalog and a store chosen by `config`
    pub fn new(config: SessionConfig) -> Self {
        let store = CredentialStore::new(&config);
        Self::with_parts(config, store, Catalog::builtin())
    }

    /// Build a context from explicit parts
    pub fn with_parts(config: SessionConfig, store: CredentialStore, catalog: Catalog) -> Self {
        let notifications = NotificationQueue::with_duration(config.notification_duration());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            notifications,
            catalog: Arc::new(catalog),
        }
    }

    /// In-memory context with default timings
    pub fn in_memory() -> Self {
        Self::new(SessionConfig::in_memory())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.store.display_mode()
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.store.set_display_mode(mode);
    }

    /// Resolve a message key under the current display mode
    pub fn resolve(&self, key: &str) -> Result<String, AppError> {
        self.catalog.resolve(key, self.display_mode())
    }

    /// Resolve a built-in key; a catalog gap degrades to the raw key
    pub(crate) fn text(&self, key: &str) -> String {
        self.catalog.resolve_or_key(key, self.display_mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_follows_display_mode() {
        let ctx = AppContext::in_memory();
        assert_eq!(
            ctx.resolve("disconnect.confirm.no").unwrap(),
            "No / नहीं"
        );

        ctx.set_display_mode(DisplayMode::English);
        assert_eq!(ctx.resolve("disconnect.confirm.no").unwrap(), "No");
        assert!(ctx.resolve("no.such.key").is_err());
    }

    #[test]
    fn test_contexts_are_independent() {
        let a = AppContext::in_memory();
        let b = AppContext::in_memory();
        a.set_display_mode(DisplayMode::LocalLanguage);
        assert_eq!(b.display_mode(), DisplayMode::Dual);
    }
}
