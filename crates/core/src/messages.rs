//! Message templates and `{:key}` interpolation.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::types::{display_value, Options};

/// Key of the fallback template used by any handler without its own message.
pub const DEFAULT_KEY: &str = "_default_";

/// Template returned when neither layer has a message for a handler.
pub const DEFAULT_MESSAGE: &str = "is invalid";

/// Regex matching `{:placeholder}` tokens in message templates.
static PLACEHOLDER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\{:(\w+)\}").expect("valid regex"));

/// Ordered table of handler name → message template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    templates: IndexMap<String, String>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn extend(&mut self, other: MessageTable) {
        self.templates.extend(other.templates);
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `self` layered over `base`: names in `self` win.
    pub fn layered_over(&self, base: &MessageTable) -> MessageTable {
        let mut merged = base.clone();
        merged.extend(self.clone());
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MessageTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Turns a message template and its params into the final message.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, template: &str, params: &Options) -> String;
}

/// Replaces `{:key}` with the rendered value of `params[key]`.
///
/// Unknown placeholders are left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFormatter;

impl MessageFormatter for PlaceholderFormatter {
    fn format(&self, template: &str, params: &Options) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &regex::Captures<'_>| {
                match params.get(&caps[1]) {
                    Some(value) => display_value(value),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn replaces_known_placeholders() {
        let out = PlaceholderFormatter.format(
            "must be between {:min} and {:max}",
            &params(json!({"min": 1, "max": 10})),
        );
        assert_eq!(out, "must be between 1 and 10");
    }

    #[test]
    fn strings_render_bare_and_lists_joined() {
        let out = PlaceholderFormatter.format(
            "{:field} must be one of {:list}",
            &params(json!({"field": "size", "list": ["s", "m", "l"]})),
        );
        assert_eq!(out, "size must be one of s, m, l");
    }

    #[test]
    fn unknown_placeholders_survive() {
        let out = PlaceholderFormatter.format("needs {:other}", &Options::new());
        assert_eq!(out, "needs {:other}");
    }

    #[test]
    fn braces_without_colon_are_literal() {
        let out = PlaceholderFormatter.format("{min} {:min}", &params(json!({"min": 2})));
        assert_eq!(out, "{min} 2");
    }

    #[test]
    fn layered_tables() {
        let base: MessageTable = [("email", "bad email"), ("min", "too small")]
            .into_iter()
            .collect();
        let top: MessageTable = [("email", "custom")].into_iter().collect();
        let merged = top.layered_over(&base);
        assert_eq!(merged.get("email"), Some("custom"));
        assert_eq!(merged.get("min"), Some("too small"));
        assert_eq!(merged.len(), 2);
    }
}
