use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// GOOGLE CALENDAR v3 WIRE TYPES
// ==============================================================================

/// An event resource. Every field is optional so the same type serves as a
/// full insert body, a sparse patch body and a deserialized response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

impl CalendarEvent {
    /// Private extended properties, the custom-field bag appointments live in.
    pub fn private_properties(&self) -> Option<&BTreeMap<String, String>> {
        self.extended_properties
            .as_ref()
            .and_then(|props| props.private.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp. Written without offset, paired with `time_zone`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a bare `YYYY-MM-DD` here instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn local(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: Some(time_zone.into()),
        }
    }

    /// `dateTime` when present, otherwise the all-day `date`.
    pub fn as_str(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorBody {
    pub error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorDetail {
    pub message: String,
}

// ==============================================================================
// QUERY TYPES
// ==============================================================================

/// Visible range of the calendar view, half-open `[time_min, time_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self { time_min, time_max }
    }

    pub fn time_min_param(&self) -> String {
        self.time_min.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn time_max_param(&self) -> String {
        self.time_max.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Google Calendar is not configured")]
    NotConfigured,

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Google Calendar authentication failed: {0}")]
    Auth(String),

    #[error("Google Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Google Calendar response: {0}")]
    Decode(String),

    #[error("Google Calendar request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_insert_body_omits_empty_fields() {
        let event = CalendarEvent {
            summary: Some("Maria".to_string()),
            start: Some(EventDateTime::local("2024-03-10T14:00:00", "America/Sao_Paulo")),
            ..Default::default()
        };

        let body = serde_json::to_value(&event).unwrap();
        assert_eq!(body, json!({
            "summary": "Maria",
            "start": { "dateTime": "2024-03-10T14:00:00", "timeZone": "America/Sao_Paulo" }
        }));
    }

    #[test]
    fn test_all_day_event_falls_back_to_date() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": "abc",
            "start": { "date": "2024-03-10" },
            "end": { "date": "2024-03-11" }
        })).unwrap();

        assert_eq!(event.start.as_ref().and_then(|s| s.as_str()), Some("2024-03-10"));
        assert!(event.private_properties().is_none());
    }

    #[test]
    fn test_range_params_match_iso_strings() {
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap(),
        );
        assert_eq!(range.time_min_param(), "2024-03-04T03:00:00.000Z");
        assert_eq!(range.time_max_param(), "2024-03-11T03:00:00.000Z");
    }
}
