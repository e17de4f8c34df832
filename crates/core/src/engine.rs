//! The validation engine.
//!
//! A [`Validator`] owns its declared rules, a local handler table, a local
//! message table and the [`ErrorMap`] of its last `validate` call. Handlers
//! and messages not found locally are looked up in the shared [`Catalog`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::Catalog;
use crate::check::{check, FormatSelector};
use crate::error::CoreError;
use crate::error_map::ErrorMap;
use crate::handler::{method_handler_name, parse_handler_name, CheckArgs, HandlerEntry, Outcome};
use crate::messages::{MessageFormatter, MessageTable, PlaceholderFormatter, DEFAULT_KEY, DEFAULT_MESSAGE};
use crate::path::{split_path, values};
use crate::registry::Registry;
use crate::rules::{events_from, parse_rule_spec, RuleOptions, RuleSet};
use crate::types::{is_empty, Options};

/// Handler whose message is recorded for a missing required field.
pub const REQUIRED_HANDLER: &str = "required";

#[derive(Clone)]
pub struct Validator {
    catalog: Arc<Catalog>,
    handlers: Registry,
    messages: MessageTable,
    rules: RuleSet,
    errors: ErrorMap,
    formatter: Arc<dyn MessageFormatter>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("handlers", &self.handlers)
            .field("messages", &self.messages)
            .field("rules", &self.rules)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Engine backed by the process-wide catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::global())
    }

    /// Engine backed by the given catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            handlers: Registry::new(),
            messages: MessageTable::new(),
            rules: RuleSet::new(),
            errors: ErrorMap::new(),
            formatter: Arc::new(PlaceholderFormatter),
        }
    }

    /// Replace the message formatter.
    pub fn with_formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Register a handler on this engine only. The catalog is not touched.
    pub fn register(&mut self, name: impl Into<String>, entry: impl Into<HandlerEntry>) -> &mut Self {
        self.handlers.register(name, entry);
        self
    }

    pub fn register_all(&mut self, entries: Registry) -> &mut Self {
        self.handlers.extend(entries);
        self
    }

    /// Whether `name` (negated or not) resolves locally or in the catalog.
    pub fn has(&self, name: &str) -> bool {
        let (handler, _) = parse_handler_name(name);
        self.handlers.contains(handler) || self.catalog.has(handler)
    }

    /// The entry `name` resolves to, local first.
    pub fn resolve(&self, name: &str) -> Result<HandlerEntry, CoreError> {
        self.with_entry(name, HandlerEntry::clone)
    }

    /// Merge `extra` into the local table (or replace the local table when
    /// `append` is false) and return the local table layered over the
    /// catalog's.
    pub fn handlers(&mut self, extra: Option<Registry>, append: bool) -> Registry {
        if !append {
            self.handlers.clear();
        }
        if let Some(extra) = extra {
            self.handlers.extend(extra);
        }
        self.handlers.layered_over(&self.catalog.handler_table())
    }

    fn with_entry<R>(&self, name: &str, f: impl FnOnce(&HandlerEntry) -> R) -> Result<R, CoreError> {
        if let Some(entry) = self.handlers.get(name) {
            return Ok(f(entry));
        }
        // The catalog hands out a clone so no lock is held while checks run.
        match self.catalog.resolve(name) {
            Some(entry) => Ok(f(&entry)),
            None => Err(CoreError::UnknownHandler(name.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Template for `name`: local, then catalog, then the `_default_` template.
    pub fn message(&self, name: &str) -> String {
        if let Some(template) = self.messages.get(name) {
            return template.to_string();
        }
        if let Some(template) = self.catalog.message(name) {
            return template;
        }
        self.messages
            .get(DEFAULT_KEY)
            .map(str::to_string)
            .or_else(|| self.catalog.message(DEFAULT_KEY))
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string())
    }

    pub fn set_message(&mut self, name: impl Into<String>, template: impl Into<String>) -> &mut Self {
        self.messages.set(name, template);
        self
    }

    /// Merge `table` into the local messages (or replace them when `append` is
    /// false) and return the local table layered over the catalog's.
    pub fn messages(&mut self, table: Option<MessageTable>, append: bool) -> MessageTable {
        if !append {
            self.messages.clear();
        }
        if let Some(table) = table {
            self.messages.extend(table);
        }
        self.messages.layered_over(&self.catalog.message_table())
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Declare rules for one field. See [`parse_rule_spec`] for the accepted
    /// shapes. Re-declaring a handler on a field replaces its options.
    pub fn rule(&mut self, field: &str, spec: &Value) -> Result<&mut Self, CoreError> {
        for (handler, options) in parse_rule_spec(field, spec)? {
            self.rules.insert(field, handler, options);
        }
        Ok(self)
    }

    /// Declare rules for many fields from an object of field → spec.
    pub fn rules(&mut self, specs: &Value) -> Result<&mut Self, CoreError> {
        let Value::Object(fields) = specs else {
            return Err(CoreError::InvalidRule {
                field: String::new(),
                reason: "rule set must be an object of field names".into(),
            });
        };
        for (field, spec) in fields {
            self.rule(field, spec)?;
        }
        Ok(self)
    }

    /// Declare one rule with already-built options.
    pub fn add_rule(&mut self, field: &str, handler: &str, options: RuleOptions) -> &mut Self {
        let options = RuleOptions {
            not: parse_handler_name(handler).1,
            ..options
        };
        self.rules.insert(field, handler, options);
        self
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    pub fn clear_rules(&mut self) -> &mut Self {
        self.rules.clear();
        self
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    /// Check a single value against a (possibly negated) handler.
    pub fn is(&self, name: &str, value: &Value, options: &Options) -> Result<bool, CoreError> {
        self.evaluate(name, value, &CheckArgs::detached(options))
            .map(|outcome| outcome.passed)
    }

    /// Like [`is`](Self::is) for a method-style identifier (`isEmail`,
    /// `isNotEmpty`).
    pub fn dispatch(&self, method: &str, value: &Value, options: &Options) -> Result<bool, CoreError> {
        let name = method_handler_name(method)
            .ok_or_else(|| CoreError::UnknownHandler(method.to_string()))?;
        self.is(&name, value, options)
    }

    /// Resolve and run a handler, returning the outcome with its params.
    pub fn evaluate(&self, name: &str, value: &Value, args: &CheckArgs<'_>) -> Result<Outcome, CoreError> {
        let (handler, negated) = parse_handler_name(name);
        let selector = FormatSelector::from_options(args.options);
        let mut outcome =
            self.with_entry(handler, |entry| check(value, &entry.as_formats(), &selector, args))?;
        outcome.passed ^= negated;
        Ok(outcome)
    }

    /// Run every declared rule against `data`.
    ///
    /// `options` are merged under each rule's own options; an `events` entry
    /// limits the call to rules whose `on` tags intersect it. Returns whether
    /// no failure was recorded. An unknown handler aborts the call.
    pub fn validate(&mut self, data: &Value, options: &Options) -> Result<bool, CoreError> {
        self.errors.clear();
        let events = events_from(options);
        let mut errors = ErrorMap::new();

        for (field, rules) in self.rules.iter() {
            let found = values(data, &split_path(field), "");

            for (name, rule) in rules {
                if !rule.applies_to(events.as_deref()) {
                    tracing::trace!(field, handler = %name, "Rule skipped for events");
                    continue;
                }

                let merged = rule.merged_with(options, field);

                if found.is_empty() {
                    if rule.required {
                        tracing::debug!(field, handler = %name, "Required field missing");
                        let template = self.message(REQUIRED_HANDLER);
                        errors.add(field, self.formatter.format(&template, &merged));
                        break;
                    }
                    continue;
                }

                for (path, value) in &found {
                    if rule.skip_empty && is_empty(value) {
                        tracing::trace!(field = %path, handler = %name, "Empty value skipped");
                        continue;
                    }

                    let args = CheckArgs {
                        options: &merged,
                        data,
                        field: path,
                    };
                    let outcome = self.evaluate(name, value, &args)?;
                    if !outcome.passed {
                        tracing::debug!(field = %path, handler = %name, "Rule failed");
                        errors.add(path.as_str(), self.render(name, rule, &merged, &outcome));
                    }
                }
            }
        }

        tracing::debug!(failed_paths = errors.len(), "Validation finished");
        self.errors = errors;
        Ok(self.errors.is_empty())
    }

    /// Failures recorded by the last `validate` call.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    fn render(&self, name: &str, rule: &RuleOptions, merged: &Options, outcome: &Outcome) -> String {
        let template = rule.message.clone().unwrap_or_else(|| self.message(name));
        let mut params = merged.clone();
        params.extend(outcome.params.clone());
        self.formatter.format(&template, &params)
    }
}
