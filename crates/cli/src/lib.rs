//! Command line front end for the validation engine.
//!
//! Loads a rules file and a data document, validates the document (or each
//! record of it) and renders the resulting error maps.

pub mod config;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;
use vigil_core::rules::EVENTS_KEY;
use vigil_core::{MessageTable, Options, Validator};

use crate::config::{CliConfig, OutputFormat};
use crate::report::{RecordResult, Report};

#[derive(Debug, Parser)]
#[command(
    name = "vigil",
    version,
    about = "Validate JSON documents against declarative field rules"
)]
pub struct Args {
    /// JSON object of field path -> rule declaration.
    #[arg(long, value_name = "FILE")]
    pub rules: PathBuf,

    /// JSON document to validate.
    #[arg(long, value_name = "FILE")]
    pub data: PathBuf,

    /// Events of this run, comma-separated (overrides `VIGIL_EVENTS`).
    #[arg(long, value_delimiter = ',')]
    pub events: Option<Vec<String>>,

    /// JSON object of handler name -> message template.
    #[arg(long, value_name = "FILE")]
    pub messages: Option<PathBuf>,

    /// Treat the data document as an array and validate each record.
    #[arg(long)]
    pub each: bool,

    /// Report format (overrides `VIGIL_OUTPUT`).
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl Args {
    pub fn output_format(&self, config: &CliConfig) -> OutputFormat {
        self.output.unwrap_or(config.output)
    }

    fn events<'a>(&'a self, config: &'a CliConfig) -> &'a [String] {
        self.events.as_deref().unwrap_or(&config.events)
    }
}

/// Build a validator from the files named in `args` and run it.
pub fn run(args: &Args, config: &CliConfig) -> anyhow::Result<Report> {
    let mut validator = Validator::new();

    let rules = read_json(&args.rules)?;
    validator
        .rules(&rules)
        .with_context(|| format!("Invalid rules in {}", args.rules.display()))?;

    if let Some(path) = &args.messages {
        let table = message_table(&read_json(path)?)
            .with_context(|| format!("Invalid messages in {}", path.display()))?;
        validator.messages(Some(table), true);
    }

    let mut options = Options::new();
    let events = args.events(config);
    if !events.is_empty() {
        options.insert(EVENTS_KEY.into(), Value::from(events.to_vec()));
    }

    let data = read_json(&args.data)?;
    let records = if args.each {
        let Value::Array(items) = &data else {
            bail!("{} must hold an array when --each is given", args.data.display());
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| check_record(&mut validator, item, &options, Some(index)))
            .collect::<anyhow::Result<Vec<_>>>()?
    } else {
        vec![check_record(&mut validator, &data, &options, None)?]
    };

    tracing::info!(
        records = records.len(),
        invalid = records.iter().filter(|r| !r.valid).count(),
        "Validation complete"
    );

    Ok(Report { records })
}

fn check_record(
    validator: &mut Validator,
    data: &Value,
    options: &Options,
    index: Option<usize>,
) -> anyhow::Result<RecordResult> {
    let valid = validator.validate(data, options)?;
    Ok(RecordResult {
        index,
        valid,
        errors: validator.errors().clone(),
    })
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn message_table(value: &Value) -> anyhow::Result<MessageTable> {
    let Value::Object(map) = value else {
        bail!("expected an object of handler name -> template");
    };
    map.iter()
        .map(|(name, template)| match template {
            Value::String(s) => Ok((name.clone(), s.clone())),
            _ => bail!("template for '{name}' must be a string"),
        })
        .collect()
}
