//! Rule-based validation of JSON documents.
//!
//! Rules are declared per field path (`people.*.email`) and name a handler
//! from a two-layer table: the engine's own handlers first, then the shared
//! [`Catalog`]. A `not:` prefix inverts any handler. Failures are collected
//! into an [`ErrorMap`] of resolved path → rendered messages.

pub mod builtin;
pub mod catalog;
pub mod check;
pub mod engine;
pub mod error;
pub mod error_map;
pub mod handler;
pub mod messages;
pub mod path;
pub mod registry;
pub mod rules;
pub mod types;

pub use catalog::Catalog;
pub use check::{check, FormatSelector};
pub use engine::Validator;
pub use error::CoreError;
pub use error_map::ErrorMap;
pub use handler::{Check, CheckArgs, Format, HandlerEntry, Outcome};
pub use messages::{MessageFormatter, MessageTable, PlaceholderFormatter};
pub use path::values;
pub use registry::Registry;
pub use rules::{RuleOptions, RuleSet};
pub use types::Options;
