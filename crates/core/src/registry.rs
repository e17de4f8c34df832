//! Named handler tables.

use indexmap::IndexMap;

use crate::handler::HandlerEntry;

/// Ordered table of handler name → entry.
///
/// Engines own a local `Registry` that shadows the shared one held by the
/// [`Catalog`](crate::Catalog).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, HandlerEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a handler.
    pub fn register(&mut self, name: impl Into<String>, entry: impl Into<HandlerEntry>) {
        self.entries.insert(name.into(), entry.into());
    }

    /// Insert or replace every handler of `other`, keeping `other`'s order for
    /// new names.
    pub fn extend(&mut self, other: Registry) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&HandlerEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<HandlerEntry> {
        self.entries.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `self` layered over `base`: names in `self` win.
    pub fn layered_over(&self, base: &Registry) -> Registry {
        let mut merged = base.clone();
        merged.extend(self.clone());
        merged
    }
}

impl<S: Into<String>> FromIterator<(S, HandlerEntry)> for Registry {
    fn from_iter<I: IntoIterator<Item = (S, HandlerEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
