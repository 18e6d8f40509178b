//! Date normalization for display.
//!
//! Stores hand back dates in several shapes (ISO dates, RFC 3339 timestamps, naive
//! timestamps, US-style dates, epoch milliseconds). Date columns are rewritten into a
//! single display format before the page is rendered. Values that do not parse are
//! left exactly as they were.

use crate::core::RecordState;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;
use std::fmt::Write;
use tracing::debug;

pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Integers below this are years or counts, not epoch milliseconds.
const MIN_EPOCH_MILLIS: u64 = 100_000_000_000;

pub const DEFAULT_ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y",
    "%Y/%m/%d",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    display_format: String,
    accepted_formats: Vec<String>,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_FORMAT)
    }
}

impl DateFormatter {
    pub fn new(display_format: impl Into<String>) -> Self {
        Self {
            display_format: display_format.into(),
            accepted_formats: DEFAULT_ACCEPTED_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }

    pub fn with_accepted_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn display_format(&self) -> &str {
        &self.display_format
    }

    /// Parses a raw date string. The display format is tried first so that already
    /// formatted values round-trip.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(date) = parse_with(raw, &self.display_format) {
            return Some(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        self.accepted_formats
            .iter()
            .find_map(|format| parse_with(raw, format))
    }

    /// Display string for a raw JSON value, or `None` when the value is not a date.
    pub fn format_value(&self, value: &JsonValue) -> Option<String> {
        let date = match value {
            JsonValue::String(raw) => self.parse(raw)?,
            JsonValue::Number(n) => {
                let millis = n
                    .as_i64()
                    .filter(|ms| ms.unsigned_abs() >= MIN_EPOCH_MILLIS)?;
                DateTime::from_timestamp_millis(millis)?.date_naive()
            }
            _ => return None,
        };
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.display_format)).ok()?;
        Some(rendered)
    }

    /// Rewrites every listed date column found in `state`. A name present both at the
    /// top level and in `extra_data` is formatted in both places. Returns how many
    /// values changed.
    pub fn format_date_values<S: AsRef<str>>(
        &self,
        state: &mut RecordState,
        columns: &[S],
    ) -> usize {
        let mut changed = 0;
        for column in columns {
            let column = column.as_ref();
            if let Some(value) = state.field_mut(column) {
                changed += usize::from(self.format_in_place(column, value));
            }
            if let Some(value) = state.extra_mut(column) {
                changed += usize::from(self.format_in_place(column, value));
            }
        }
        changed
    }

    fn format_in_place(&self, column: &str, value: &mut JsonValue) -> bool {
        match self.format_value(value) {
            Some(formatted) if value.as_str() != Some(formatted.as_str()) => {
                *value = JsonValue::String(formatted);
                true
            }
            Some(_) => false,
            None => {
                if !value.is_null() {
                    debug!(column, value = %value, "leaving unparseable date value unchanged");
                }
                false
            }
        }
    }
}

fn parse_with(raw: &str, format: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formats_common_shapes() {
        let f = DateFormatter::default();
        assert_eq!(f.format_value(&json!("2016-01-05")).as_deref(), Some("2016-01-05"));
        assert_eq!(
            f.format_value(&json!("2016-01-05T17:30:00Z")).as_deref(),
            Some("2016-01-05")
        );
        assert_eq!(
            f.format_value(&json!("2016-01-05T17:30:00.123")).as_deref(),
            Some("2016-01-05")
        );
        assert_eq!(
            f.format_value(&json!("2016-01-05 08:00:00")).as_deref(),
            Some("2016-01-05")
        );
        assert_eq!(f.format_value(&json!("01/05/2016")).as_deref(), Some("2016-01-05"));
        assert_eq!(
            f.format_value(&json!(1451952000000_i64)).as_deref(),
            Some("2016-01-05")
        );
    }

    #[test]
    fn test_non_dates_are_not_formatted() {
        let f = DateFormatter::default();
        assert_eq!(f.format_value(&json!("next tuesday")), None);
        assert_eq!(f.format_value(&json!("")), None);
        assert_eq!(f.format_value(&json!(null)), None);
        assert_eq!(f.format_value(&json!(true)), None);
        assert_eq!(f.format_value(&json!(1.5)), None);
        assert_eq!(f.format_value(&json!(2016)), None);
    }

    #[test]
    fn test_formatting_is_idempotent() {
        for format in ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"] {
            let f = DateFormatter::new(format);
            let once = f.format_value(&json!("2018-07-16T21:55:00Z")).unwrap();
            let twice = f.format_value(&json!(once.clone())).unwrap();
            assert_eq!(once, twice, "format {format}");
        }
    }

    #[test]
    fn test_format_date_values_leaves_bad_values() {
        let mut state = RecordState::from_json(json!({
            "release_date": "2016-03-01T00:00:00Z",
            "generation_date": "not a date",
            "recent_sale_date": null,
            "year_built": 1990,
            "extra_data": {"Inspection Date": "03/15/2017"}
        }))
        .unwrap();

        let changed = DateFormatter::default().format_date_values(
            &mut state,
            &[
                "release_date",
                "generation_date",
                "recent_sale_date",
                "Inspection Date",
                "missing",
            ],
        );

        assert_eq!(changed, 2);
        assert_eq!(state.get("release_date"), Some(&json!("2016-03-01")));
        assert_eq!(state.get("generation_date"), Some(&json!("not a date")));
        assert_eq!(state.get("recent_sale_date"), Some(&json!(null)));
        assert_eq!(state.get("year_built"), Some(&json!(1990)));
        assert_eq!(state.extra("Inspection Date"), Some(&json!("2017-03-15")));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut state =
            RecordState::from_json(json!({"release_date": "2016-03-01 10:00:00"})).unwrap();
        let f = DateFormatter::default();
        assert_eq!(f.format_date_values(&mut state, &["release_date"]), 1);
        let snapshot = state.clone();
        assert_eq!(f.format_date_values(&mut state, &["release_date"]), 0);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_formats_both_twins_of_a_shared_name() {
        let mut state = RecordState::from_json(json!({
            "recent_sale_date": "2015-11-30T00:00:00Z",
            "extra_data": {"recent_sale_date": "12/01/2015"}
        }))
        .unwrap();
        let changed =
            DateFormatter::default().format_date_values(&mut state, &["recent_sale_date"]);
        assert_eq!(changed, 2);
        assert_eq!(state.get("recent_sale_date"), Some(&json!("2015-11-30")));
        assert_eq!(state.extra("recent_sale_date"), Some(&json!("2015-12-01")));
    }

    #[test]
    fn test_out_of_range_numbers_are_left_alone() {
        let f = DateFormatter::default();
        assert_eq!(f.format_value(&json!(i64::MIN)), None);
        assert_eq!(f.format_value(&json!(i64::MAX)), None);
        assert_eq!(f.format_value(&json!(u64::MAX)), None);

        let mut state = RecordState::from_json(json!({
            "release_date": i64::MIN,
            "generation_date": i64::MAX
        }))
        .unwrap();
        let changed = f.format_date_values(&mut state, &["release_date", "generation_date"]);
        assert_eq!(changed, 0);
        assert_eq!(state.get("release_date"), Some(&json!(i64::MIN)));
        assert_eq!(state.get("generation_date"), Some(&json!(i64::MAX)));
    }
}
