use chrono::{NaiveDate, NaiveTime};

use crate::models::{
    AppointmentChanges, AppointmentError, AppointmentFields, AppointmentInput,
    CreateAppointmentRequest, UpdateAppointmentRequest, MIN_EDITABLE_DURATION_MINUTES,
};
use crate::services::normalizer::{parse_date, parse_time};

fn invalid(message: impl Into<String>) -> AppointmentError {
    AppointmentError::ValidationError(message.into())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppointmentError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid(format!("Field '{}' is required", field)))
}

fn date_field(raw: &str) -> Result<NaiveDate, AppointmentError> {
    parse_date(raw).ok_or_else(|| invalid(format!("Field 'date' must be YYYY-MM-DD, got '{}'", raw)))
}

fn time_field(raw: &str) -> Result<NaiveTime, AppointmentError> {
    parse_time(raw).ok_or_else(|| invalid(format!("Field 'time' must be HH:MM, got '{}'", raw)))
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl CreateAppointmentRequest {
    pub fn validate(self) -> Result<AppointmentInput, AppointmentError> {
        let date = date_field(required(&self.date, "date")?)?;
        let time = time_field(required(&self.time, "time")?)?;
        let patient_name = required(&self.patient_name, "patientName")?.to_string();

        let duration_minutes = match self.duration_minutes {
            None => None,
            Some(minutes) if minutes > 0 => Some(
                u32::try_from(minutes)
                    .map_err(|_| invalid("Field 'durationMinutes' is out of range"))?,
            ),
            Some(_) => return Err(invalid("Field 'durationMinutes' must be a positive number of minutes")),
        };

        let recurrence_months = match self.recurrence_months {
            None => 0,
            Some(months) => u32::try_from(months)
                .map_err(|_| invalid("Field 'recurrenceMonths' must be zero or a positive number of months"))?,
        };

        Ok(AppointmentInput {
            date,
            time,
            duration_minutes,
            recurrence_months,
            fields: AppointmentFields {
                patient_name,
                age: trimmed(self.age),
                treatment: trimmed(self.treatment),
                notes: trimmed(self.notes),
                professional: trimmed(self.professional),
                vip: self.vip.unwrap_or(false),
                attendance_status: self.attendance_status.unwrap_or_default(),
                idempotency_key: self
                    .idempotency_key
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
            },
        })
    }
}

impl UpdateAppointmentRequest {
    pub fn validate(self) -> Result<AppointmentChanges, AppointmentError> {
        let id = required(&self.id, "id")?.to_string();

        let date = self.date.as_deref().map(str::trim).map(date_field).transpose()?;
        let time = self.time.as_deref().map(str::trim).map(time_field).transpose()?;

        let duration_minutes = self
            .duration_minutes
            .map(|minutes| {
                u32::try_from(minutes)
                    .ok()
                    .filter(|m| *m >= MIN_EDITABLE_DURATION_MINUTES)
                    .ok_or_else(|| invalid(format!(
                        "Field 'durationMinutes' must be at least {} minutes",
                        MIN_EDITABLE_DURATION_MINUTES
                    )))
            })
            .transpose()?;

        let patient_name = match self.patient_name {
            Some(name) if name.trim().is_empty() => {
                return Err(invalid("Field 'patientName' cannot be empty"));
            }
            other => other.map(|name| name.trim().to_string()),
        };

        Ok(AppointmentChanges {
            id,
            date,
            time,
            duration_minutes,
            patient_name,
            age: self.age.map(|v| v.trim().to_string()),
            treatment: self.treatment.map(|v| v.trim().to_string()),
            notes: self.notes.map(|v| v.trim().to_string()),
            professional: self.professional.map(|v| v.trim().to_string()),
            vip: self.vip,
            attendance_status: self.attendance_status,
        })
    }
}
