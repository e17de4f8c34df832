//! Process-wide handler and message tables.
//!
//! A [`Catalog`] owns the shared layer that every engine falls back to. The
//! process keeps one lazily created instance ([`Catalog::global`]); engines
//! hold it by `Arc` and shadow it with their own local tables. Tests and
//! embedders that need isolation can build a private catalog instead.
//!
//! Mutation is meant for startup. The locks make concurrent use memory-safe
//! but do not order administrative calls against running validations.

use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::builtin;
use crate::handler::HandlerEntry;
use crate::messages::MessageTable;
use crate::registry::Registry;

static GLOBAL: LazyLock<Arc<Catalog>> = LazyLock::new(|| Arc::new(Catalog::with_defaults()));

#[derive(Debug, Default)]
pub struct Catalog {
    handlers: RwLock<Registry>,
    messages: RwLock<MessageTable>,
}

impl Catalog {
    /// The shared process-wide catalog, populated with the builtin checks on
    /// first use.
    pub fn global() -> Arc<Catalog> {
        Arc::clone(&GLOBAL)
    }

    /// A catalog holding the builtin checks and their messages.
    pub fn with_defaults() -> Self {
        let (handlers, messages) = builtin::defaults();
        Self {
            handlers: RwLock::new(handlers),
            messages: RwLock::new(messages),
        }
    }

    /// A catalog with no handlers and no messages.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Restore the builtin handlers and messages, dropping anything registered
    /// since.
    pub fn reset(&self) {
        let (handlers, messages) = builtin::defaults();
        *self.handlers_mut() = handlers;
        *self.messages_mut() = messages;
        tracing::debug!("Catalog reset to builtin handlers");
    }

    /// Remove every handler and message.
    pub fn clear(&self) {
        self.handlers_mut().clear();
        self.messages_mut().clear();
        tracing::debug!("Catalog cleared");
    }

    pub fn register(&self, name: impl Into<String>, entry: impl Into<HandlerEntry>) {
        self.handlers_mut().register(name, entry);
    }

    pub fn register_all(&self, entries: Registry) {
        self.handlers_mut().extend(entries);
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers().contains(name)
    }

    /// Clone of the entry registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<HandlerEntry> {
        self.handlers().get(name).cloned()
    }

    /// Snapshot of the handler table.
    pub fn handler_table(&self) -> Registry {
        self.handlers().clone()
    }

    pub fn set_message(&self, name: impl Into<String>, template: impl Into<String>) {
        self.messages_mut().set(name, template);
    }

    /// Merge `table` into the messages, or replace them wholesale when
    /// `append` is false.
    pub fn set_messages(&self, table: MessageTable, append: bool) {
        let mut messages = self.messages_mut();
        if !append {
            messages.clear();
        }
        messages.extend(table);
    }

    pub fn message(&self, name: &str) -> Option<String> {
        self.messages().get(name).map(str::to_string)
    }

    /// Snapshot of the message table.
    pub fn message_table(&self) -> MessageTable {
        self.messages().clone()
    }

    // A panic while holding a lock leaves a table that is still structurally
    // valid, so poisoning is ignored.

    fn handlers(&self) -> RwLockReadGuard<'_, Registry> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn messages(&self) -> RwLockReadGuard<'_, MessageTable> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn messages_mut(&self) -> RwLockWriteGuard<'_, MessageTable> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DEFAULT_KEY;

    #[test]
    fn defaults_include_builtins_and_fallback_message() {
        let catalog = Catalog::with_defaults();
        assert!(catalog.has("email"));
        assert!(catalog.has("creditCard"));
        assert_eq!(catalog.message("required").as_deref(), Some("is required"));
        assert_eq!(catalog.message(DEFAULT_KEY).as_deref(), Some("is invalid"));
    }

    #[test]
    fn register_all_adds_and_replaces() {
        let catalog = Catalog::with_defaults();
        let before = catalog.handler_table().len();
        let entries: Registry = [
            ("custom", HandlerEntry::test(|_, _| true)),
            ("email", HandlerEntry::test(|_, _| true)),
        ]
        .into_iter()
        .collect();
        catalog.register_all(entries);

        assert!(catalog.has("custom"));
        assert_eq!(catalog.handler_table().len(), before + 1);
        let options = crate::types::Options::new();
        let args = crate::handler::CheckArgs::detached(&options);
        let email = catalog.resolve("email").unwrap();
        assert!(email.as_formats()[0].check.run(&serde_json::json!("bad"), &args).passed);
    }

    #[test]
    fn reset_drops_custom_handlers() {
        let catalog = Catalog::with_defaults();
        catalog.register("custom", HandlerEntry::test(|_, _| true));
        catalog.set_message("custom", "custom failed");
        assert!(catalog.has("custom"));

        catalog.reset();
        assert!(!catalog.has("custom"));
        assert!(catalog.message("custom").is_none());
        assert!(catalog.has("email"));
    }

    #[test]
    fn clear_empties_everything() {
        let catalog = Catalog::with_defaults();
        catalog.clear();
        assert!(!catalog.has("email"));
        assert!(catalog.message(DEFAULT_KEY).is_none());
        assert!(catalog.handler_table().is_empty());
    }

    #[test]
    fn empty_catalog_has_nothing() {
        let catalog = Catalog::empty();
        assert!(catalog.handler_table().is_empty());
        assert!(catalog.message_table().is_empty());
    }

    #[test]
    fn set_messages_replace_or_merge() {
        let catalog = Catalog::with_defaults();
        catalog.set_messages([("email", "nope")].into_iter().collect(), true);
        assert_eq!(catalog.message("email").as_deref(), Some("nope"));
        assert!(catalog.message("required").is_some());

        catalog.set_messages([("only", "one")].into_iter().collect(), false);
        assert_eq!(catalog.message_table().len(), 1);
        assert!(catalog.message("required").is_none());
    }

    #[test]
    fn global_is_shared() {
        let a = Catalog::global();
        let b = Catalog::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
