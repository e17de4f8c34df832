//! Format evaluation for single and multi-format handlers.

use serde_json::Value;

use crate::handler::{CheckArgs, Format, Outcome};
use crate::types::Options;

/// Option key holding the format selector.
pub const FORMAT_KEY: &str = "format";
/// Accepted alias of [`FORMAT_KEY`].
pub const CHECK_KEY: &str = "check";

/// Param naming the format that satisfied a multi-format handler.
pub const MATCHED_FORMAT_PARAM: &str = "matched_format";

/// Which formats of a multi-format handler to evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormatSelector {
    /// Pass when any format passes, trying them in order.
    #[default]
    Any,
    /// Pass only when every format passes.
    All,
    /// Evaluate only the named formats, passing on the first success.
    Only(Vec<String>),
}

impl FormatSelector {
    /// Parse a selector value: `"any"`, `"all"`, a name, a comma-separated
    /// list of names, or an array of names. Anything else is `Any`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => match s.trim() {
                "" | "any" => FormatSelector::Any,
                "all" => FormatSelector::All,
                list => FormatSelector::Only(
                    list.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
            },
            Value::Array(items) => FormatSelector::Only(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => FormatSelector::Any,
        }
    }

    /// Read the selector from `format`, falling back to `check`.
    pub fn from_options(options: &Options) -> Self {
        options
            .get(FORMAT_KEY)
            .or_else(|| options.get(CHECK_KEY))
            .map(Self::from_value)
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        match self {
            FormatSelector::Any => Value::from("any"),
            FormatSelector::All => Value::from("all"),
            FormatSelector::Only(names) => Value::from(names.clone()),
        }
    }

    fn selects(&self, name: Option<&str>) -> bool {
        match (self, name) {
            // A single unnamed check always runs.
            (_, None) => true,
            (FormatSelector::Any | FormatSelector::All, Some(_)) => true,
            (FormatSelector::Only(names), Some(name)) => names.iter().any(|n| n == name),
        }
    }
}

/// Evaluate `value` against an ordered list of formats.
///
/// Formats not chosen by `selector` are never run. Under `Any`/`Only` the
/// first passing format wins and its params are returned along with
/// `matched_format`; under `All` every selected format must pass and their
/// params are merged.
pub fn check(
    value: &Value,
    formats: &[Format<'_>],
    selector: &FormatSelector,
    args: &CheckArgs<'_>,
) -> Outcome {
    let mut selected = formats.iter().filter(|f| selector.selects(f.name)).peekable();

    if *selector == FormatSelector::All {
        if selected.peek().is_none() {
            return Outcome::fail();
        }
        let mut params = Options::new();
        for format in selected {
            let outcome = format.check.run(value, args);
            params.extend(outcome.params);
            if !outcome.passed {
                return Outcome {
                    passed: false,
                    params,
                };
            }
        }
        return Outcome {
            passed: true,
            params,
        };
    }

    let mut params = Options::new();
    for format in selected {
        let outcome = format.check.run(value, args);
        if outcome.passed {
            let mut outcome = outcome;
            if let Some(name) = format.name {
                outcome
                    .params
                    .insert(MATCHED_FORMAT_PARAM.to_string(), Value::from(name));
            }
            return outcome;
        }
        params.extend(outcome.params);
    }

    Outcome {
        passed: false,
        params,
    }
}
