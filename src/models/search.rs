use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `datetime-local` input format used by the landing page
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const DEFAULT_LOCATION: &str = "Pune";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

/// Field name to message, in a stable order for the response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchErrors(pub BTreeMap<&'static str, String>);

impl std::fmt::Display for SearchErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for SearchErrors {}

pub fn format_for_input(date: NaiveDateTime) -> String {
    date.format(INPUT_FORMAT).to_string()
}

fn parse_input(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), INPUT_FORMAT).ok()
}

impl SearchForm {
    pub fn defaults(now: NaiveDateTime) -> Self {
        Self {
            location: default_location(),
            start_date: format_for_input(now),
            end_date: format_for_input(now + Duration::days(1)),
        }
    }

    /// Moving the start date drags the end date to one day later.
    pub fn set_start_date(&mut self, value: &str) {
        self.start_date = value.to_string();
        if let Some(start) = parse_input(value) {
            self.end_date = format_for_input(start + Duration::days(1));
        }
    }

    pub fn validate(&self) -> Result<(NaiveDateTime, NaiveDateTime), SearchErrors> {
        let mut errors = BTreeMap::new();

        let start = if self.start_date.trim().is_empty() {
            errors.insert("startDate", "Start Date is required.".to_string());
            None
        } else {
            let parsed = parse_input(&self.start_date);
            if parsed.is_none() {
                errors.insert("startDate", "Start Date is invalid.".to_string());
            }
            parsed
        };

        let end = if self.end_date.trim().is_empty() {
            errors.insert("endDate", "End Date is required.".to_string());
            None
        } else {
            let parsed = parse_input(&self.end_date);
            if parsed.is_none() {
                errors.insert("endDate", "End Date is invalid.".to_string());
            }
            parsed
        };

        match (start, end) {
            (Some(start), Some(end)) if end <= start => {
                errors.insert("endDate", "End Date must be after Start Date.".to_string());
                Err(SearchErrors(errors))
            }
            (Some(start), Some(end)) if errors.is_empty() => Ok((start, end)),
            _ => Err(SearchErrors(errors)),
        }
    }
}
