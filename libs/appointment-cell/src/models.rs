// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use shared_calendar::{CalendarError, TimeRange};
use shared_config::AppConfig;

/// Value of the treatment selector's "all treatments" option.
pub const ALL_TREATMENTS_SENTINEL: &str = "Todos os tratamentos";

/// Title used when an event carries neither a patient name nor a summary.
pub const FALLBACK_TITLE: &str = "Agendamento";

/// Shortest duration a practitioner may set when editing an appointment.
pub const MIN_EDITABLE_DURATION_MINUTES: u32 = 15;

/// Keys of the private extended properties an appointment is stored under.
pub mod keys {
    pub const PATIENT_NAME: &str = "patientName";
    pub const AGE: &str = "age";
    pub const TREATMENT: &str = "treatment";
    pub const NOTES: &str = "notes";
    pub const PROFESSIONAL: &str = "professional";
    pub const VIP: &str = "vip";
    pub const ATTENDANCE_STATUS: &str = "attendanceStatus";
    /// Older records stored the attendance outcome under this key.
    pub const LEGACY_ATTENDANCE_STATUS: &str = "presence";
    pub const IDEMPOTENCY_KEY: &str = "idemKey";
}

// ==============================================================================
// ATTENDANCE STATUS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[default]
    #[serde(rename = "NAO_PREENCHIDO", alias = "UNFILLED")]
    Unfilled,
    #[serde(rename = "ATENDIDO", alias = "ATTENDED")]
    Attended,
    #[serde(rename = "DESMARCADO", alias = "CANCELLED_BY_PATIENT")]
    CancelledByPatient,
    #[serde(rename = "FALTOU", alias = "NO_SHOW")]
    NoShow,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Unfilled,
        AttendanceStatus::Attended,
        AttendanceStatus::CancelledByPatient,
        AttendanceStatus::NoShow,
    ];

    /// Tag persisted in the calendar store.
    pub fn tag(&self) -> &'static str {
        match self {
            AttendanceStatus::Unfilled => "NAO_PREENCHIDO",
            AttendanceStatus::Attended => "ATENDIDO",
            AttendanceStatus::CancelledByPatient => "DESMARCADO",
            AttendanceStatus::NoShow => "FALTOU",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Unfilled => "Não preenchido",
            AttendanceStatus::Attended => "Atendimento realizado",
            AttendanceStatus::CancelledByPatient => "Desmarcou",
            AttendanceStatus::NoShow => "Faltou",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AttendanceStatus::Unfilled => "#3b82f6",
            AttendanceStatus::Attended => "#16a34a",
            AttendanceStatus::CancelledByPatient => "#f59e0b",
            AttendanceStatus::NoShow => "#dc2626",
        }
    }

    /// Reads whatever a record carries: stored tags, enum spellings or
    /// display labels, in any case. Anything unrecognised is `Unfilled`.
    pub fn normalize(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();

        if value.contains("realizado") || value == "atendido" || value == "attended" {
            AttendanceStatus::Attended
        } else if value.contains("desmarc") || value == "cancelled_by_patient" {
            AttendanceStatus::CancelledByPatient
        } else if value.contains("faltou") || value == "no_show" {
            AttendanceStatus::NoShow
        } else {
            AttendanceStatus::Unfilled
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ==============================================================================
// APPOINTMENT FIELDS (typed view of the private extended properties)
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFields {
    pub patient_name: String,
    pub age: String,
    pub treatment: String,
    pub notes: String,
    pub professional: String,
    pub vip: bool,
    pub attendance_status: AttendanceStatus,
    pub idempotency_key: Option<String>,
}

// ==============================================================================
// SCHEDULING MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    pub time_zone: String,
    pub default_duration_minutes: u32,
}

impl ScheduleSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            time_zone: config.calendar_time_zone.clone(),
            default_duration_minutes: config.default_duration_minutes,
        }
    }
}

/// Start and end as local wall-clock strings, both in `time_zone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start_local: String,
    pub end_local: String,
    pub time_zone: String,
}

/// Monthly repetition on the first occurrence's day-of-month and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Total occurrences, the first one included.
    pub count: u32,
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RRULE:FREQ=MONTHLY;COUNT={}", self.count)
    }
}

/// A create request after validation.
#[derive(Debug, Clone)]
pub struct AppointmentInput {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub fields: AppointmentFields,
    pub duration_minutes: Option<u32>,
    pub recurrence_months: u32,
}

/// An update request after validation; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub professional: Option<String>,
    pub vip: Option<bool>,
    pub attendance_status: Option<AttendanceStatus>,
}

impl AppointmentChanges {
    pub fn reschedules(&self) -> bool {
        self.date.is_some() || self.time.is_some() || self.duration_minutes.is_some()
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Request bodies may carry a tag, an enum spelling or a display label.
fn deserialize_attendance_status<'de, D>(deserializer: D) -> Result<Option<AttendanceStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(AttendanceStatus::normalize))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub professional: Option<String>,
    pub vip: Option<bool>,
    pub duration_minutes: Option<i64>,
    pub recurrence_months: Option<i64>,
    #[serde(default, alias = "presence", deserialize_with = "deserialize_attendance_status")]
    pub attendance_status: Option<AttendanceStatus>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub professional: Option<String>,
    pub vip: Option<bool>,
    pub duration_minutes: Option<i64>,
    #[serde(default, alias = "presence", deserialize_with = "deserialize_attendance_status")]
    pub attendance_status: Option<AttendanceStatus>,
}

/// Query string of `GET /events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub patient: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub treatment: Option<String>,
    pub professional: Option<String>,
    pub status: Option<String>,
    pub vip: Option<String>,
}

impl EventQuery {
    pub fn time_range(&self) -> Result<TimeRange, AppointmentError> {
        let (Some(from), Some(to)) = (non_blank(&self.from), non_blank(&self.to)) else {
            return Err(AppointmentError::ValidationError(
                "Query params 'from' and 'to' are required (ISO strings).".to_string(),
            ));
        };

        let parse = |name: &str, raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppointmentError::ValidationError(format!(
                    "Query param '{}' must be an RFC 3339 timestamp, got '{}'", name, raw
                )))
        };

        let (time_min, time_max) = (parse("from", from)?, parse("to", to)?);
        if time_min >= time_max {
            return Err(AppointmentError::ValidationError(format!(
                "Query param 'from' ({}) must be before 'to' ({})", from, to
            )));
        }

        Ok(TimeRange::new(time_min, time_max))
    }

    pub fn filters(&self) -> EventFilters {
        EventFilters {
            patient: non_blank(&self.patient).map(str::to_string),
            treatment: non_blank(&self.treatment).map(str::to_string),
            professional: non_blank(&self.professional).map(str::to_string),
            attendance_status: non_blank(&self.status).map(str::to_string),
            date: non_blank(&self.date).map(str::to_string),
            time: non_blank(&self.time).map(str::to_string),
            vip: match non_blank(&self.vip) {
                Some("true") => Some(true),
                Some("false") => Some(false),
                _ => None,
            },
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Independent optional predicates; every one that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub patient: Option<String>,
    pub treatment: Option<String>,
    pub professional: Option<String>,
    pub attendance_status: Option<String>,
    /// `YYYY-MM-DD`, compared with the local start date.
    pub date: Option<String>,
    /// `HH:MM`, compared with the local start time.
    pub time: Option<String>,
    pub vip: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub color: String,
    pub extended_props: ProjectedFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedFields {
    pub patient_name: String,
    pub age: String,
    pub treatment: String,
    pub notes: String,
    pub professional: String,
    pub vip: bool,
    pub attendance_status: AttendanceStatus,
    pub attendance_label: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Calendar store is not configured")]
    NotConfigured,

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl From<CalendarError> for AppointmentError {
    fn from(error: CalendarError) -> Self {
        match error {
            CalendarError::NotConfigured => AppointmentError::NotConfigured,
            CalendarError::NotFound(msg) => AppointmentError::NotFound(msg),
            other => AppointmentError::ExternalServiceError(other.to_string()),
        }
    }
}
