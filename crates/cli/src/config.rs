use std::str::FromStr;

use anyhow::bail;

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per failing path.
    #[default]
    Text,
    /// The error map as a JSON document.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format '{other}' (expected text or json)"),
        }
    }
}

/// CLI defaults loaded from environment variables.
///
/// Command line flags override every value here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Report format (default: `text`).
    pub output: OutputFormat,
    /// Events passed to every `validate` call, parsed from comma-separated
    /// `VIGIL_EVENTS` (default: none).
    pub events: Vec<String>,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var         | Default |
    /// |-----------------|---------|
    /// | `VIGIL_OUTPUT`  | `text`  |
    /// | `VIGIL_EVENTS`  | (none)  |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let output = match lookup("VIGIL_OUTPUT") {
            Some(raw) => raw.parse()?,
            None => OutputFormat::default(),
        };

        let events = lookup("VIGIL_EVENTS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        Ok(Self { output, events })
    }
}

/// Split a comma-separated list, dropping blank items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = CliConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn reads_output_and_events() {
        let config = CliConfig::from_lookup(env(&[
            ("VIGIL_OUTPUT", "JSON"),
            ("VIGIL_EVENTS", "create, update,,"),
        ]))
        .unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.events, vec!["create", "update"]);
    }

    #[test]
    fn rejects_unknown_output() {
        assert!(CliConfig::from_lookup(env(&[("VIGIL_OUTPUT", "yaml")])).is_err());
    }
}
