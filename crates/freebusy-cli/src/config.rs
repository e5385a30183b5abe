//! Configuration file for `fbmerge`.
//!
//! JSON, every field optional:
//!
//! ```json
//! { "window_days": 180, "lookback_days": 0, "subject_separator": ", ", "max_instances": 500 }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use freebusy_engine::expander::DEFAULT_MAX_INSTANCES;
use freebusy_engine::merger::DEFAULT_SUBJECT_SEPARATOR;
use freebusy_engine::TimeWindow;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Length of the publish window in days.
    pub window_days: u32,
    /// How far before now the publish window starts, in days.
    pub lookback_days: u32,
    pub subject_separator: String,
    /// Cap on instances expanded per recurring item.
    pub max_instances: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_days: 180,
            lookback_days: 0,
            subject_separator: DEFAULT_SUBJECT_SEPARATOR.to_string(),
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl Config {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(&raw).with_context(|| format!("Invalid config file: {}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Publish window relative to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::starting_at(now, self.lookback_days, self.window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = Config::parse(r#"{"window_days": 30, "subject_separator": " | "}"#).unwrap();
        assert_eq!(config.window_days, 30);
        assert_eq!(config.subject_separator, " | ");
        assert_eq!(config.lookback_days, 0);
        assert_eq!(config.max_instances, 500);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse(r#"{"window": 30}"#).is_err());
    }

    #[test]
    fn window_spans_lookback_and_length() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let config = Config {
            window_days: 10,
            lookback_days: 2,
            ..Config::default()
        };
        let window = config.window(now);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap().timestamp()
        );
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2026, 3, 18, 12, 0, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some("/nonexistent/fbmerge.json")).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
