//! Rule declarations: per-field handler options and their parsing.

use indexmap::IndexMap;
use serde_json::Value;

use crate::check::{FormatSelector, CHECK_KEY, FORMAT_KEY};
use crate::error::CoreError;
use crate::handler::parse_handler_name;
use crate::types::Options;

const MESSAGE_KEY: &str = "message";
const REQUIRED_KEY: &str = "required";
const SKIP_EMPTY_KEY: &str = "skipEmpty";
const SKIP_EMPTY_ALIAS: &str = "skip_empty";
const NOT_KEY: &str = "not";
const ON_KEY: &str = "on";

/// Option key on `validate` naming the events of the current call.
pub const EVENTS_KEY: &str = "events";

/// Option key attached to every evaluation with the declared field name.
pub const FIELD_KEY: &str = "field";

/// Options of one `(field, handler)` rule, merged over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOptions {
    /// Template overriding the handler's default message.
    pub message: Option<String>,
    pub required: bool,
    pub skip_empty: bool,
    pub format: FormatSelector,
    /// Set from the `not:` prefix of the handler name.
    pub not: bool,
    /// Event tags this rule is limited to; `None` applies to every call.
    pub on: Option<Vec<String>>,
    /// Handler-specific options (`min`, `list`, ...).
    pub params: Options,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            message: None,
            required: true,
            skip_empty: false,
            format: FormatSelector::Any,
            not: false,
            on: None,
            params: Options::new(),
        }
    }
}

impl RuleOptions {
    /// Parse an options map for `handler` on `field`, merging over defaults.
    pub fn from_map(field: &str, handler: &str, map: &Options) -> Result<Self, CoreError> {
        let mut options = RuleOptions {
            not: parse_handler_name(handler).1,
            ..RuleOptions::default()
        };

        for (key, value) in map {
            match key.as_str() {
                MESSAGE_KEY => {
                    options.message = match value {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        _ => return Err(invalid(field, "'message' must be a string")),
                    }
                }
                REQUIRED_KEY => options.required = expect_bool(field, key, value)?,
                SKIP_EMPTY_KEY | SKIP_EMPTY_ALIAS => {
                    options.skip_empty = expect_bool(field, key, value)?
                }
                FORMAT_KEY | CHECK_KEY => options.format = FormatSelector::from_value(value),
                // Negation comes from the handler name only.
                NOT_KEY => {}
                ON_KEY => options.on = parse_tags(value),
                _ => {
                    options.params.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(options)
    }

    /// Rule with only a custom message.
    pub fn with_message(handler: &str, message: impl Into<String>) -> Self {
        RuleOptions {
            message: Some(message.into()),
            not: parse_handler_name(handler).1,
            ..RuleOptions::default()
        }
    }

    /// Whether the rule runs for a call limited to `events`.
    ///
    /// A call without events runs every rule; a rule without `on` runs for
    /// every call. An empty tag list on either side is no scope.
    pub fn applies_to(&self, events: Option<&[String]>) -> bool {
        match (&self.on, events) {
            (Some(on), Some(events)) if !on.is_empty() && !events.is_empty() => {
                on.iter().any(|tag| events.contains(tag))
            }
            _ => true,
        }
    }

    /// Flatten into an options map, the form handlers and templates see.
    pub fn to_options(&self) -> Options {
        let mut map = Options::new();
        map.insert(
            MESSAGE_KEY.into(),
            self.message.clone().map_or(Value::Null, Value::from),
        );
        map.insert(REQUIRED_KEY.into(), Value::from(self.required));
        map.insert(SKIP_EMPTY_KEY.into(), Value::from(self.skip_empty));
        map.insert(FORMAT_KEY.into(), self.format.to_value());
        map.insert(NOT_KEY.into(), Value::from(self.not));
        map.insert(
            ON_KEY.into(),
            self.on.clone().map_or(Value::Null, Value::from),
        );
        map.extend(self.params.clone());
        map
    }

    /// Runtime options overlaid by this rule's own options, plus the field.
    pub fn merged_with(&self, runtime: &Options, field: &str) -> Options {
        let mut merged = runtime.clone();
        merged.extend(self.to_options());
        merged.insert(FIELD_KEY.into(), Value::from(field));
        merged
    }
}

/// Parse the `events` of a `validate` call, if any.
pub fn events_from(options: &Options) -> Option<Vec<String>> {
    options.get(EVENTS_KEY).and_then(parse_tags)
}

/// Tags from a string or an array of strings. No tags means no scope.
fn parse_tags(value: &Value) -> Option<Vec<String>> {
    let tags: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    let tags: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    (!tags.is_empty()).then_some(tags)
}

fn expect_bool(field: &str, key: &str, value: &Value) -> Result<bool, CoreError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(field, &format!("'{key}' must be a boolean")))
}

fn invalid(field: &str, reason: &str) -> CoreError {
    CoreError::InvalidRule {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Declaration parsing
// ---------------------------------------------------------------------------

/// Normalise one field's rule declaration into `(handler, options)` pairs.
///
/// Accepted shapes:
///
/// - `"email"`
/// - `{"email": "custom message"}`
/// - `{"min": {"min": 3, "message": "..."}}`
/// - `{"email": null}` (defaults)
/// - an array of any of the above
pub fn parse_rule_spec(field: &str, spec: &Value) -> Result<Vec<(String, RuleOptions)>, CoreError> {
    let mut rules = Vec::new();
    push_rules(field, spec, &mut rules)?;
    Ok(rules)
}

fn push_rules(
    field: &str,
    spec: &Value,
    rules: &mut Vec<(String, RuleOptions)>,
) -> Result<(), CoreError> {
    match spec {
        Value::String(name) => {
            let name = checked_name(field, name)?;
            rules.push((name.to_string(), RuleOptions::from_map(field, name, &Options::new())?));
        }
        Value::Object(map) => {
            for (name, value) in map {
                let name = checked_name(field, name)?;
                let options = match value {
                    Value::Null => RuleOptions::from_map(field, name, &Options::new())?,
                    Value::String(message) => RuleOptions::with_message(name, message.as_str()),
                    Value::Object(opts) => RuleOptions::from_map(field, name, opts)?,
                    _ => {
                        return Err(invalid(
                            field,
                            &format!("options for '{name}' must be a message or an object"),
                        ))
                    }
                };
                rules.push((name.to_string(), options));
            }
        }
        Value::Array(items) => {
            for item in items {
                push_rules(field, item, rules)?;
            }
        }
        _ => {
            return Err(invalid(
                field,
                "expected a handler name, an object or an array",
            ))
        }
    }
    Ok(())
}

fn checked_name<'a>(field: &str, name: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = name.trim();
    if parse_handler_name(trimmed).0.is_empty() {
        return Err(invalid(field, "handler name must not be empty"));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Declared rules: field path → handler name → options, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: IndexMap<String, IndexMap<String, RuleOptions>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rule. Replacing keeps the rule's original position.
    pub fn insert(&mut self, field: impl Into<String>, handler: impl Into<String>, options: RuleOptions) {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(handler.into(), options);
    }

    pub fn get(&self, field: &str, handler: &str) -> Option<&RuleOptions> {
        self.fields.get(field).and_then(|rules| rules.get(handler))
    }

    pub fn field(&self, field: &str) -> Option<&IndexMap<String, RuleOptions>> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, RuleOptions>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn map(value: Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn bare_name_gets_defaults() {
        let rules = parse_rule_spec("title", &json!("email")).unwrap();
        assert_eq!(rules, vec![("email".to_string(), RuleOptions::default())]);
    }

    #[test]
    fn negated_name_sets_not() {
        let rules = parse_rule_spec("title", &json!("not:empty")).unwrap();
        assert_eq!(rules[0].0, "not:empty");
        assert!(rules[0].1.not);
        assert!(rules[0].1.required);
    }

    #[test]
    fn message_shorthand() {
        let rules = parse_rule_spec("email", &json!({"email": "bad address"})).unwrap();
        assert_eq!(rules[0].1.message.as_deref(), Some("bad address"));
    }

    #[test]
    fn full_options_split_into_known_and_params() {
        let rules = parse_rule_spec(
            "age",
            &json!({"min": {"min": 18, "required": false, "skipEmpty": true, "on": ["create", "update"]}}),
        )
        .unwrap();
        let opts = &rules[0].1;
        assert!(!opts.required);
        assert!(opts.skip_empty);
        assert_eq!(opts.on, Some(vec!["create".into(), "update".into()]));
        assert_eq!(opts.params.get("min"), Some(&json!(18)));
        assert!(!opts.params.contains_key("required"));
    }

    #[test]
    fn not_option_is_ignored() {
        let rules = parse_rule_spec("x", &json!({"email": {"not": true}})).unwrap();
        assert!(!rules[0].1.not);
    }

    #[test]
    fn array_of_mixed_shapes() {
        let rules = parse_rule_spec(
            "x",
            &json!(["required", {"lengthMax": {"max": 5}}, {"email": "bad"}]),
        )
        .unwrap();
        let names: Vec<_> = rules.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["required", "lengthMax", "email"]);
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert_matches!(
            parse_rule_spec("x", &json!(42)),
            Err(CoreError::InvalidRule { field, .. }) if field == "x"
        );
        assert_matches!(
            parse_rule_spec("x", &json!({"min": 3})),
            Err(CoreError::InvalidRule { .. })
        );
        assert_matches!(
            parse_rule_spec("x", &json!({"min": {"required": "yes"}})),
            Err(CoreError::InvalidRule { .. })
        );
        assert_matches!(
            parse_rule_spec("x", &json!("not:")),
            Err(CoreError::InvalidRule { .. })
        );
    }

    #[test]
    fn format_accepts_check_alias() {
        let rules = parse_rule_spec("card", &json!({"creditCard": {"check": "visa"}})).unwrap();
        assert_eq!(rules[0].1.format, FormatSelector::Only(vec!["visa".into()]));
    }

    #[test]
    fn event_scoping() {
        let scoped = RuleOptions {
            on: Some(vec!["create".into()]),
            ..RuleOptions::default()
        };
        let create = vec!["create".to_string()];
        let update = vec!["update".to_string()];
        assert!(scoped.applies_to(Some(&create)));
        assert!(!scoped.applies_to(Some(&update)));
        assert!(scoped.applies_to(None));
        assert!(RuleOptions::default().applies_to(Some(&update)));
    }

    #[test]
    fn empty_tag_lists_are_no_scope() {
        let scoped = RuleOptions {
            on: Some(vec!["create".into()]),
            ..RuleOptions::default()
        };
        assert!(scoped.applies_to(Some(&[])));

        let unscoped = RuleOptions {
            on: Some(Vec::new()),
            ..RuleOptions::default()
        };
        assert!(unscoped.applies_to(Some(&["create".to_string()])));

        let parsed = RuleOptions::from_map("title", "required", &map(json!({"on": []}))).unwrap();
        assert_eq!(parsed.on, None);
        assert_eq!(events_from(&map(json!({"events": []}))), None);
        assert_eq!(events_from(&map(json!({"events": " "}))), None);
    }

    #[test]
    fn rule_options_win_over_runtime() {
        let opts = RuleOptions::from_map("age", "min", &map(json!({"min": 5}))).unwrap();
        let merged = opts.merged_with(&map(json!({"min": 1, "locale": "de"})), "age");
        assert_eq!(merged.get("min"), Some(&json!(5)));
        assert_eq!(merged.get("locale"), Some(&json!("de")));
        assert_eq!(merged.get(FIELD_KEY), Some(&json!("age")));
        assert_eq!(merged.get("required"), Some(&json!(true)));
    }

    #[test]
    fn events_parse_from_string_or_list() {
        assert_eq!(
            events_from(&map(json!({"events": "create"}))),
            Some(vec!["create".to_string()])
        );
        assert_eq!(
            events_from(&map(json!({"events": ["a", "b"]}))),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(events_from(&Options::new()), None);
    }

    #[test]
    fn redeclaring_replaces_options() {
        let mut set = RuleSet::new();
        set.insert("x", "min", RuleOptions::from_map("x", "min", &map(json!({"min": 1}))).unwrap());
        set.insert("x", "email", RuleOptions::default());
        set.insert("x", "min", RuleOptions::from_map("x", "min", &map(json!({"min": 5}))).unwrap());

        let rules = set.field("x").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.keys().next().map(String::as_str), Some("min"));
        assert_eq!(set.get("x", "min").unwrap().params.get("min"), Some(&json!(5)));
    }
}
