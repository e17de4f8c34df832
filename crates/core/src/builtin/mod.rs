//! The builtin check catalog.
//!
//! Every check here is a stateless predicate over the value and its already
//! merged options. [`defaults`] builds the handler and message tables a fresh
//! [`Catalog`](crate::Catalog) starts from.

mod cards;
mod dates;
mod network;
mod numbers;
mod presence;
mod strings;

use crate::handler::{Check, CheckArgs};
use crate::messages::{MessageTable, DEFAULT_KEY, DEFAULT_MESSAGE};
use crate::registry::Registry;
use crate::types::as_number;

pub use cards::luhn;

/// Builtin handlers and their default messages.
pub fn defaults() -> (Registry, MessageTable) {
    let mut handlers = Registry::new();
    let mut messages = MessageTable::new();
    messages.set(DEFAULT_KEY, DEFAULT_MESSAGE);

    presence::register(&mut handlers, &mut messages);
    numbers::register(&mut handlers, &mut messages);
    strings::register(&mut handlers, &mut messages);
    network::register(&mut handlers, &mut messages);
    dates::register(&mut handlers, &mut messages);
    cards::register(&mut handlers, &mut messages);

    (handlers, messages)
}

/// Compile a builtin whole-value pattern.
fn pattern(source: &str) -> Check {
    Check::pattern(source).expect("builtin pattern compiles")
}

/// Numeric option, logging when a handler is used without it.
fn number_option(handler: &str, args: &CheckArgs<'_>, key: &str) -> Option<f64> {
    let value = args.option(key).and_then(as_number);
    if value.is_none() {
        tracing::warn!(handler, option = key, field = args.field, "Missing numeric option");
    }
    value
}

/// Count option (`length`, `places`), logging when absent or negative.
fn count_option(handler: &str, args: &CheckArgs<'_>, key: &str) -> Option<usize> {
    number_option(handler, args, key)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as usize)
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;

    use crate::check::{check, FormatSelector};
    use crate::handler::CheckArgs;
    use crate::types::Options;

    /// Run a builtin by name with the given options and document.
    pub fn run_with(name: &str, value: Value, options: Value, data: Value) -> bool {
        let (handlers, _) = super::defaults();
        let entry = handlers
            .get(name)
            .unwrap_or_else(|| panic!("builtin {name} is registered"));
        let options: Options = options.as_object().cloned().unwrap_or_default();
        let args = CheckArgs {
            options: &options,
            data: &data,
            field: "field",
        };
        check(
            &value,
            &entry.as_formats(),
            &FormatSelector::from_options(&options),
            &args,
        )
        .passed
    }

    pub fn run(name: &str, value: Value, options: Value) -> bool {
        run_with(name, value, options, Value::Null)
    }

    pub fn passes(name: &str, value: Value) -> bool {
        run(name, value, serde_json::json!({}))
    }
}
