//! Handler definitions: checks, outcomes and handler names.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::CoreError;
use crate::path;
use crate::types::{scalar_text, Options};

/// Prefix that inverts a handler's result (`not:email`).
pub const NEGATION_PREFIX: &str = "not:";

static NULL: Value = Value::Null;

/// Signature of an executable check.
pub type Predicate = Arc<dyn Fn(&Value, &CheckArgs<'_>) -> Outcome + Send + Sync>;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of evaluating a check: pass/fail plus params for the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub passed: bool,
    pub params: Options,
}

impl Outcome {
    pub fn pass() -> Self {
        Self::from_bool(true)
    }

    pub fn fail() -> Self {
        Self::from_bool(false)
    }

    pub fn from_bool(passed: bool) -> Self {
        Self {
            passed,
            params: Options::new(),
        }
    }

    /// Attach an interpolation param.
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        Self::from_bool(passed)
    }
}

// ---------------------------------------------------------------------------
// Check arguments
// ---------------------------------------------------------------------------

/// Everything a check may look at besides the value itself.
#[derive(Debug, Clone, Copy)]
pub struct CheckArgs<'a> {
    /// Merged rule + runtime options.
    pub options: &'a Options,
    /// The complete input document, for cross-field checks.
    pub data: &'a Value,
    /// Resolved path of the value under test (empty outside `validate`).
    pub field: &'a str,
}

impl<'a> CheckArgs<'a> {
    /// Arguments for a standalone call with no surrounding document.
    pub fn detached(options: &'a Options) -> Self {
        Self {
            options,
            data: &NULL,
            field: "",
        }
    }

    pub fn option(&self, key: &str) -> Option<&'a Value> {
        self.options.get(key)
    }

    pub fn str_option(&self, key: &str) -> Option<&'a str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn bool_option(&self, key: &str) -> bool {
        self.options
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Look up a dotted path in the input document (no wildcards).
    pub fn lookup(&self, dotted: &str) -> Option<&'a Value> {
        path::lookup(self.data, dotted)
    }
}

// ---------------------------------------------------------------------------
// Checks and handler entries
// ---------------------------------------------------------------------------

/// A single check: a whole-value pattern or an executable predicate.
#[derive(Clone)]
pub enum Check {
    Pattern(Regex),
    Predicate(Predicate),
}

impl Check {
    /// Compile a pattern that must match the entire value.
    pub fn pattern(source: &str) -> Result<Self, CoreError> {
        let anchored = format!("^(?:{source})$");
        Regex::new(&anchored)
            .map(Check::Pattern)
            .map_err(|source_err| CoreError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &CheckArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        Check::Predicate(Arc::new(f))
    }

    /// Predicate returning a plain boolean.
    pub fn test<F>(f: F) -> Self
    where
        F: Fn(&Value, &CheckArgs<'_>) -> bool + Send + Sync + 'static,
    {
        Self::predicate(move |value, args| Outcome::from_bool(f(value, args)))
    }

    pub fn run(&self, value: &Value, args: &CheckArgs<'_>) -> Outcome {
        match self {
            Check::Pattern(re) => {
                Outcome::from_bool(scalar_text(value).is_some_and(|text| re.is_match(&text)))
            }
            Check::Predicate(f) => f(value, args),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Check::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// What a handler name resolves to.
#[derive(Debug, Clone)]
pub enum HandlerEntry {
    Single(Check),
    /// Named sub-formats, evaluated in insertion order.
    Formats(IndexMap<String, Check>),
}

impl HandlerEntry {
    pub fn pattern(source: &str) -> Result<Self, CoreError> {
        Check::pattern(source).map(HandlerEntry::Single)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &CheckArgs<'_>) -> Outcome + Send + Sync + 'static,
    {
        HandlerEntry::Single(Check::predicate(f))
    }

    pub fn test<F>(f: F) -> Self
    where
        F: Fn(&Value, &CheckArgs<'_>) -> bool + Send + Sync + 'static,
    {
        HandlerEntry::Single(Check::test(f))
    }

    /// Build a multi-format entry. A repeated name replaces the earlier check
    /// but keeps its position.
    pub fn formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = (S, Check)>,
        S: Into<String>,
    {
        HandlerEntry::Formats(
            formats
                .into_iter()
                .map(|(name, check)| (name.into(), check))
                .collect(),
        )
    }

    /// Ordered view used by the format evaluator.
    pub fn as_formats(&self) -> Vec<Format<'_>> {
        match self {
            HandlerEntry::Single(check) => vec![Format { name: None, check }],
            HandlerEntry::Formats(map) => map
                .iter()
                .map(|(name, check)| Format {
                    name: Some(name.as_str()),
                    check,
                })
                .collect(),
        }
    }
}

impl From<Check> for HandlerEntry {
    fn from(check: Check) -> Self {
        HandlerEntry::Single(check)
    }
}

/// One evaluable format of a handler; unnamed for single-check handlers.
#[derive(Debug, Clone, Copy)]
pub struct Format<'a> {
    pub name: Option<&'a str>,
    pub check: &'a Check,
}

// ---------------------------------------------------------------------------
// Handler names
// ---------------------------------------------------------------------------

/// Split a rule name into the handler name and its negation flag.
pub fn parse_handler_name(name: &str) -> (&str, bool) {
    match name.strip_prefix(NEGATION_PREFIX) {
        Some(rest) => (rest, true),
        None => (name, false),
    }
}

/// Map a method-style identifier onto a rule name.
///
/// `isEmail` becomes `email`, `isNotEmail` becomes `not:email`. Identifiers
/// that do not follow the `is<Name>` convention yield `None`.
pub fn method_handler_name(ident: &str) -> Option<String> {
    let rest = ident.strip_prefix("is")?;
    let (rest, negated) = match rest.strip_prefix("Not") {
        Some(tail) if tail.starts_with(|c: char| c.is_ascii_uppercase()) => (tail, true),
        _ => (rest, false),
    };

    let mut chars = rest.chars();
    let first = chars.next().filter(char::is_ascii_uppercase)?;
    let name: String = first.to_ascii_lowercase().to_string() + chars.as_str();

    Some(if negated {
        format!("{NEGATION_PREFIX}{name}")
    } else {
        name
    })
}
