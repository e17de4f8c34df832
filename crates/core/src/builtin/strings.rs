//! Length, membership, pattern and equality checks.

use serde_json::Value;

use super::{count_option, pattern};
use crate::handler::{CheckArgs, HandlerEntry};
use crate::messages::MessageTable;
use crate::registry::Registry;
use crate::types::scalar_text;

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register("alphaNumeric", pattern("[A-Za-z0-9]+"));
    messages.set("alphaNumeric", "may only contain letters and numbers");

    handlers.register(
        "length",
        HandlerEntry::test(|value, args| {
            match (length_of(value), count_option("length", args, "length")) {
                (Some(len), Some(expected)) => len == expected,
                _ => false,
            }
        }),
    );
    messages.set("length", "must be exactly {:length} characters long");

    handlers.register(
        "lengthMin",
        HandlerEntry::test(|value, args| {
            match (length_of(value), count_option("lengthMin", args, "min")) {
                (Some(len), Some(min)) => len >= min,
                _ => false,
            }
        }),
    );
    messages.set("lengthMin", "must be at least {:min} characters long");

    handlers.register(
        "lengthMax",
        HandlerEntry::test(|value, args| {
            match (length_of(value), count_option("lengthMax", args, "max")) {
                (Some(len), Some(max)) => len <= max,
                _ => false,
            }
        }),
    );
    messages.set("lengthMax", "must not exceed {:max} characters");

    handlers.register(
        "lengthBetween",
        HandlerEntry::test(|value, args| {
            match (
                length_of(value),
                count_option("lengthBetween", args, "min"),
                count_option("lengthBetween", args, "max"),
            ) {
                (Some(len), Some(min), Some(max)) => (min..=max).contains(&len),
                _ => false,
            }
        }),
    );
    messages.set("lengthBetween", "must be between {:min} and {:max} characters long");

    handlers.register("inList", HandlerEntry::test(in_list));
    messages.set("inList", "is not a valid option");

    handlers.register("regex", HandlerEntry::test(matches_regex));
    messages.set("regex", "is not in a valid format");

    handlers.register("equalTo", HandlerEntry::test(equal_to));
    messages.set("equalTo", "must match {:other}");
}

/// Characters of a string or elements of an array.
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn in_list(value: &Value, args: &CheckArgs<'_>) -> bool {
    let Some(list) = args.option("list").and_then(Value::as_array) else {
        tracing::warn!(field = args.field, "inList used without a 'list' option");
        return false;
    };

    if args.bool_option("strict") {
        return list.contains(value);
    }

    match scalar_text(value) {
        Some(text) => list
            .iter()
            .filter_map(scalar_text)
            .any(|candidate| candidate == text),
        None => list.contains(value),
    }
}

fn matches_regex(value: &Value, args: &CheckArgs<'_>) -> bool {
    let Some(source) = args.str_option("pattern") else {
        tracing::warn!(field = args.field, "regex used without a 'pattern' option");
        return false;
    };
    let re = match regex::Regex::new(source) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(field = args.field, pattern = source, error = %e, "Invalid regex option");
            return false;
        }
    };
    scalar_text(value).is_some_and(|text| re.is_match(&text))
}

fn equal_to(value: &Value, args: &CheckArgs<'_>) -> bool {
    let Some(other) = args.str_option("other") else {
        tracing::warn!(field = args.field, "equalTo used without an 'other' option");
        return false;
    };
    args.lookup(other).is_some_and(|other_value| other_value == value)
}
