//! Presence and truthiness checks.

use serde_json::Value;

use crate::handler::HandlerEntry;
use crate::messages::MessageTable;
use crate::registry::Registry;
use crate::types::is_empty;

const ACCEPTED_WORDS: &[&str] = &["1", "yes", "on", "true"];
const BOOLEAN_WORDS: &[&str] = &["0", "1", "true", "false"];

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register("required", HandlerEntry::test(|value, _| !is_empty(value)));
    messages.set("required", "is required");

    handlers.register("empty", HandlerEntry::test(|value, _| is_empty(value)));
    messages.set("empty", "must be empty");

    handlers.register("accepted", HandlerEntry::test(|value, _| accepted(value)));
    messages.set("accepted", "must be accepted");

    handlers.register("boolean", HandlerEntry::test(|value, _| boolean(value)));
    messages.set("boolean", "must be a boolean");
}

fn accepted(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => ACCEPTED_WORDS.contains(&s.trim().to_lowercase().as_str()),
        _ => false,
    }
}

fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0 | 1)),
        Value::String(s) => BOOLEAN_WORDS.contains(&s.trim().to_lowercase().as_str()),
        _ => false,
    }
}
