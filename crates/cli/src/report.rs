use std::fmt::Write as _;

use serde::Serialize;
use vigil_core::ErrorMap;

use crate::config::OutputFormat;

/// Outcome of validating one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    /// Position in the input array when records are validated separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub valid: bool,
    pub errors: ErrorMap,
}

/// Results of one CLI run.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Report {
    pub records: Vec<RecordResult>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.records.iter().all(|r| r.valid)
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => {
                let mut out = match self.records.as_slice() {
                    [single] if single.index.is_none() => serde_json::to_string_pretty(single)?,
                    _ => serde_json::to_string_pretty(self)?,
                };
                out.push('\n');
                Ok(out)
            }
        }
    }

    fn render_text(&self) -> String {
        if self.is_valid() {
            return "OK\n".to_string();
        }

        let mut out = String::new();
        for record in self.records.iter().filter(|r| !r.valid) {
            let prefix = record
                .index
                .map(|i| format!("[{i}] "))
                .unwrap_or_default();
            for (path, messages) in record.errors.iter() {
                for message in messages {
                    let _ = writeln!(out, "{prefix}{path}: {message}");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failing(index: Option<usize>) -> RecordResult {
        let mut errors = ErrorMap::new();
        errors.add("title", "is required");
        errors.add("title", "is too short");
        RecordResult {
            index,
            valid: false,
            errors,
        }
    }

    fn passing(index: Option<usize>) -> RecordResult {
        RecordResult {
            index,
            valid: true,
            errors: ErrorMap::new(),
        }
    }

    #[test]
    fn text_lists_each_message() {
        let report = Report {
            records: vec![failing(None)],
        };
        assert_eq!(
            report.render(OutputFormat::Text).unwrap(),
            "title: is required\ntitle: is too short\n"
        );
    }

    #[test]
    fn text_prefixes_record_index() {
        let report = Report {
            records: vec![passing(Some(0)), failing(Some(1))],
        };
        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.starts_with("[1] title: is required\n"));
        assert!(!text.contains("[0]"));
    }

    #[test]
    fn text_reports_ok_when_valid() {
        let report = Report {
            records: vec![passing(None)],
        };
        assert!(report.is_valid());
        assert_eq!(report.render(OutputFormat::Text).unwrap(), "OK\n");
    }

    #[test]
    fn json_single_record_is_an_object() {
        let report = Report {
            records: vec![failing(None)],
        };
        let rendered: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({"valid": false, "errors": {"title": ["is required", "is too short"]}})
        );
    }

    #[test]
    fn json_records_are_an_array() {
        let report = Report {
            records: vec![passing(Some(0)), failing(Some(1))],
        };
        let rendered: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(rendered[0], json!({"index": 0, "valid": true, "errors": {}}));
        assert_eq!(rendered[1]["index"], json!(1));
    }
}
