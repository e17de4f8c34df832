//! Date and time checks.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde_json::Value;

use super::pattern;
use crate::handler::{CheckArgs, HandlerEntry, Outcome};
use crate::messages::MessageTable;
use crate::registry::Registry;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register(
        "date",
        HandlerEntry::test(|value, _| value.as_str().and_then(parse_datetime).is_some()),
    );
    messages.set("date", "is not a valid date");

    handlers.register("dateFormat", HandlerEntry::test(date_format));
    messages.set("dateFormat", "must be a date in the format {:date_format}");

    handlers.register(
        "dateBefore",
        HandlerEntry::predicate(|value, args| compare(value, args, "before", |v, bound| v < bound)),
    );
    messages.set("dateBefore", "must be before {:before}");

    handlers.register(
        "dateAfter",
        HandlerEntry::predicate(|value, args| compare(value, args, "after", |v, bound| v > bound)),
    );
    messages.set("dateAfter", "must be after {:after}");

    handlers.register(
        "time",
        HandlerEntry::formats([
            ("24h", pattern(r"(?:[01]?[0-9]|2[0-3]):[0-5][0-9](?::[0-5][0-9])?")),
            (
                "12h",
                pattern(r"(?:0?[1-9]|1[0-2]):[0-5][0-9](?::[0-5][0-9])?\s?(?i:am|pm)"),
            ),
        ]),
    );
    messages.set("time", "is not a valid time");
}

/// Parse the date forms accepted by the date checks.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (normalised to UTC) and
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`. `now` and `today` resolve
/// against the current UTC clock.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    match text {
        "now" => return Some(Utc::now().naive_utc()),
        "today" => return Utc::now().date_naive().and_hms_opt(0, 0, 0),
        _ => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a bound the way the caller most likely wrote it.
fn render(dt: &NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
        dt.format(DATE_FORMAT).to_string()
    } else {
        dt.format(DATETIME_FORMATS[0]).to_string()
    }
}

fn compare(
    value: &Value,
    args: &CheckArgs<'_>,
    key: &str,
    holds: fn(&NaiveDateTime, &NaiveDateTime) -> bool,
) -> Outcome {
    let Some(bound) = args.str_option(key).and_then(parse_datetime) else {
        tracing::warn!(field = args.field, option = key, "Missing or unparseable date bound");
        return Outcome::fail();
    };
    let passed = value
        .as_str()
        .and_then(parse_datetime)
        .is_some_and(|dt| holds(&dt, &bound));
    Outcome::from_bool(passed).with_param(key, render(&bound))
}

fn date_format(value: &Value, args: &CheckArgs<'_>) -> bool {
    let Some(fmt) = args.str_option("date_format") else {
        tracing::warn!(field = args.field, "dateFormat used without a 'date_format' option");
        return false;
    };
    let Some(text) = value.as_str() else {
        return false;
    };
    NaiveDateTime::parse_from_str(text, fmt).is_ok()
        || NaiveDate::parse_from_str(text, fmt).is_ok()
        || NaiveTime::parse_from_str(text, fmt).is_ok()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{passes, run};
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_supported_forms() {
        assert!(parse_datetime("2024-02-29").is_some());
        assert!(parse_datetime("2024-02-30").is_none());
        assert!(parse_datetime("2024-01-01 10:30:00").is_some());
        assert!(parse_datetime("2024-01-01T10:30:00").is_some());
        assert!(parse_datetime("2024-01-01T10:30:00+02:00").is_some());
        assert!(parse_datetime("today").is_some());
        assert!(parse_datetime("yesterday-ish").is_none());
    }

    #[test]
    fn rfc3339_is_normalised_to_utc() {
        let dt = parse_datetime("2024-01-01T01:00:00+02:00").unwrap();
        assert_eq!(render(&dt), "2023-12-31 23:00:00");
    }

    #[test]
    fn date_check() {
        assert!(passes("date", json!("2024-05-01")));
        assert!(!passes("date", json!("05/01/2024")));
        assert!(!passes("date", json!(20240501)));
    }

    #[test]
    fn date_format_option() {
        let opts = json!({"date_format": "%d/%m/%Y"});
        assert!(run("dateFormat", json!("01/05/2024"), opts.clone()));
        assert!(!run("dateFormat", json!("2024-05-01"), opts));
        assert!(run("dateFormat", json!("13:45"), json!({"date_format": "%H:%M"})));
        assert!(!passes("dateFormat", json!("2024-05-01")));
    }

    #[test]
    fn before_and_after() {
        assert!(run("dateBefore", json!("2024-01-01"), json!({"before": "2024-06-01"})));
        assert!(!run("dateBefore", json!("2024-06-01"), json!({"before": "2024-06-01"})));
        assert!(run("dateAfter", json!("2024-06-02"), json!({"after": "2024-06-01"})));
        assert!(!run("dateAfter", json!("not a date"), json!({"after": "2024-06-01"})));
        assert!(!run("dateAfter", json!("2024-06-02"), json!({"after": "soon"})));
    }

    #[test]
    fn bound_is_reported_normalised() {
        let opts = serde_json::Map::from_iter([("before".to_string(), json!("2024-06-01T00:00:00Z"))]);
        let args = CheckArgs::detached(&opts);
        let outcome = compare(&json!("2025-01-01"), &args, "before", |v, b| v < b);
        assert!(!outcome.passed);
        assert_eq!(outcome.params.get("before"), Some(&json!("2024-06-01")));
    }

    #[test]
    fn time_formats() {
        assert!(passes("time", json!("23:59")));
        assert!(passes("time", json!("07:05:09")));
        assert!(passes("time", json!("7:05 pm")));
        assert!(!passes("time", json!("24:00")));
        assert!(!run("time", json!("7:05 PM"), json!({"format": "24h"})));
    }

    #[test]
    fn time_rejects_non_ascii_digits() {
        assert!(!passes("time", json!("\u{0661}\u{0662}:\u{0663}\u{0664}")));
        assert!(!passes("time", json!("7:\u{0660}5 pm")));
    }
}
