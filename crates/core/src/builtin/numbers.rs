//! Numeric checks and bounds.

use std::sync::LazyLock;

use serde_json::Value;

use super::{count_option, number_option, pattern};
use crate::handler::{HandlerEntry, Outcome};
use crate::messages::MessageTable;
use crate::registry::Registry;
use crate::types::{as_number, scalar_text};

static DECIMAL_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^-?[0-9]+(?:\.([0-9]+))?$").expect("valid regex"));

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register("numeric", HandlerEntry::test(|value, _| as_number(value).is_some()));
    messages.set("numeric", "must be a number");

    handlers.register(
        "integer",
        HandlerEntry::test(|value, args| integer(value, args.bool_option("strict"))),
    );
    messages.set("integer", "must be an integer");

    handlers.register(
        "decimal",
        HandlerEntry::predicate(|value, args| {
            let places = match args.option("places") {
                Some(_) => match count_option("decimal", args, "places") {
                    Some(places) => Some(places),
                    None => return Outcome::fail(),
                },
                None => None,
            };
            Outcome::from_bool(decimal(value, places))
        }),
    );
    messages.set("decimal", "must be a decimal number");

    handlers.register(
        "money",
        HandlerEntry::formats([
            ("plain", pattern(r"-?[0-9]+(?:\.[0-9]{2})?")),
            ("grouped", pattern(r"-?[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{2})?")),
        ]),
    );
    messages.set("money", "must be a valid amount");

    handlers.register(
        "min",
        HandlerEntry::test(|value, args| {
            match (as_number(value), number_option("min", args, "min")) {
                (Some(n), Some(min)) => n >= min,
                _ => false,
            }
        }),
    );
    messages.set("min", "must be at least {:min}");

    handlers.register(
        "max",
        HandlerEntry::test(|value, args| {
            match (as_number(value), number_option("max", args, "max")) {
                (Some(n), Some(max)) => n <= max,
                _ => false,
            }
        }),
    );
    messages.set("max", "must be no more than {:max}");

    handlers.register(
        "inRange",
        HandlerEntry::test(|value, args| {
            match (
                as_number(value),
                number_option("inRange", args, "min"),
                number_option("inRange", args, "max"),
            ) {
                (Some(n), Some(min), Some(max)) => (min..=max).contains(&n),
                _ => false,
            }
        }),
    );
    messages.set("inRange", "must be between {:min} and {:max}");
}

fn integer(value: &Value, strict: bool) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) if !strict => {
            let s = s.trim();
            let digits = s.strip_prefix('-').unwrap_or(s);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

fn decimal(value: &Value, places: Option<usize>) -> bool {
    let Some(text) = scalar_text(value) else {
        return false;
    };
    if matches!(value, Value::Bool(_)) {
        return false;
    }
    let Some(caps) = DECIMAL_RE.captures(text.trim()) else {
        return false;
    };
    match places {
        Some(places) => caps.get(1).map_or(0, |m| m.len()) == places,
        None => true,
    }
}
