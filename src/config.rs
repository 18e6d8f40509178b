use crate::core::{DetailError, Result};
use crate::format::{DEFAULT_ACCEPTED_FORMATS, DEFAULT_DISPLAY_FORMAT, DateFormatter};
use crate::signals::DEFAULT_SIGNAL_CAPACITY;
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

/// Session configuration
///
/// Built with chained setters or read from JSON:
///
/// ```
/// use record_detail::SessionConfig;
///
/// let config = SessionConfig::new()
///     .date_display_format("%m/%d/%Y")
///     .adopt_store_response(false);
/// assert!(config.validate().is_ok());
///
/// let config = SessionConfig::from_json_str(r#"{"date_display_format": "%d.%m.%Y"}"#).unwrap();
/// assert!(config.adopt_store_response);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// chrono format used for date columns on display
    pub date_display_format: String,

    /// Formats tried, in order, when reading raw date values
    pub accepted_date_formats: Vec<String>,

    /// Replace the working record with the store's response after a successful save
    pub adopt_store_response: bool,

    /// Check system keys and fixed columns before sending an update
    pub validate_reserved_fields: bool,

    /// Buffered lifecycle signals per subscriber
    pub signal_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            date_display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            accepted_date_formats: DEFAULT_ACCEPTED_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            adopt_store_response: true,
            validate_reserved_fields: true,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_display_format(mut self, format: &str) -> Self {
        self.date_display_format = format.to_string();
        self
    }

    pub fn accepted_date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn adopt_store_response(mut self, adopt: bool) -> Self {
        self.adopt_store_response = adopt;
        self
    }

    pub fn validate_reserved_fields(mut self, validate: bool) -> Self {
        self.validate_reserved_fields = validate;
        self
    }

    pub fn signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        check_format(&self.date_display_format)?;
        for format in &self.accepted_date_formats {
            check_format(format)?;
        }

        // Formatted dates are parsed again on the next pass; the display format has to
        // read back what it writes.
        let sample = NaiveDate::from_ymd_opt(2016, 7, 16)
            .ok_or_else(|| DetailError::Config("invalid sample date".to_string()))?;
        let mut rendered = String::new();
        let readable = write!(rendered, "{}", sample.format(&self.date_display_format)).is_ok()
            && self.date_formatter().parse(&rendered) == Some(sample);
        if !readable {
            return Err(DetailError::Config(format!(
                "date_display_format '{}' cannot be read back",
                self.date_display_format
            )));
        }

        if self.signal_capacity == 0 {
            return Err(DetailError::Config("signal_capacity must be > 0".to_string()));
        }

        Ok(())
    }

    pub fn date_formatter(&self) -> DateFormatter {
        DateFormatter::new(self.date_display_format.clone())
            .with_accepted_formats(self.accepted_date_formats.iter().cloned())
    }
}

fn check_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        return Err(DetailError::Config("date format cannot be empty".to_string()));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DetailError::Config(format!("invalid date format '{format}'")));
    }
    Ok(())
}
