/// Configuration errors raised by the engine.
///
/// Data that fails a rule is never an error: failures are collected into the
/// [`ErrorMap`](crate::ErrorMap). These variants describe caller mistakes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    #[error("Invalid rule for field '{field}': {reason}")]
    InvalidRule { field: String, reason: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
