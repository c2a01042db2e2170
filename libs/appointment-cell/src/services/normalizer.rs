use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::{keys, AppointmentError, AppointmentFields, ScheduleSettings, ScheduleWindow};

/// Wall-clock format sent to the calendar: no offset, no fraction.
pub const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .and_then(|time| time.with_second(0))
}

/// Local wall-clock value of a stored start/end string. Offsets returned by
/// the store are already those of the configured zone, so they are dropped.
pub fn parse_local(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, LOCAL_DATE_TIME_FORMAT))
        .ok()
}

/// Builds the start/end pair for an appointment.
///
/// The date and time are taken literally as wall-clock values in the
/// configured zone; no conversion happens here. A missing or zero duration
/// falls back to the configured default. An end past the last representable
/// date is a validation error.
pub fn schedule_window(
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: Option<u32>,
    settings: &ScheduleSettings,
) -> Result<ScheduleWindow, AppointmentError> {
    let minutes = duration_minutes
        .filter(|m| *m > 0)
        .unwrap_or(settings.default_duration_minutes);

    let start = date.and_time(time);
    let end = start
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
        .ok_or_else(|| AppointmentError::ValidationError(format!(
            "Fields 'date' and 'durationMinutes' put the end past the supported range ({} + {} minutes)",
            date, minutes
        )))?;

    Ok(ScheduleWindow {
        start_local: start.format(LOCAL_DATE_TIME_FORMAT).to_string(),
        end_local: end.format(LOCAL_DATE_TIME_FORMAT).to_string(),
        time_zone: settings.time_zone.clone(),
    })
}

/// `⭐ VIP Maria – Pilates`
pub fn event_summary(fields: &AppointmentFields) -> String {
    let treatment = (!fields.treatment.is_empty()).then(|| format!("– {}", fields.treatment));

    [
        fields.vip.then(|| "⭐ VIP".to_string()),
        Some(fields.patient_name.clone()),
        treatment,
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

pub fn event_description(fields: &AppointmentFields) -> String {
    [
        ("Observação", &fields.notes),
        ("Idade", &fields.age),
        ("Profissional", &fields.professional),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{}: {}", label, value))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Serializes the typed fields into the store's private property bag.
pub fn write_fields(fields: &AppointmentFields) -> BTreeMap<String, String> {
    let mut private = BTreeMap::from([
        (keys::PATIENT_NAME.to_string(), fields.patient_name.clone()),
        (keys::AGE.to_string(), fields.age.clone()),
        (keys::TREATMENT.to_string(), fields.treatment.clone()),
        (keys::NOTES.to_string(), fields.notes.clone()),
        (keys::PROFESSIONAL.to_string(), fields.professional.clone()),
        (keys::VIP.to_string(), fields.vip.to_string()),
        (keys::ATTENDANCE_STATUS.to_string(), fields.attendance_status.tag().to_string()),
    ]);

    if let Some(key) = &fields.idempotency_key {
        private.insert(keys::IDEMPOTENCY_KEY.to_string(), key.clone());
    }

    private
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;

    fn settings() -> ScheduleSettings {
        ScheduleSettings {
            time_zone: "America/Sao_Paulo".to_string(),
            default_duration_minutes: 50,
        }
    }

    fn window(date: &str, time: &str, minutes: Option<u32>) -> ScheduleWindow {
        schedule_window(parse_date(date).unwrap(), parse_time(time).unwrap(), minutes, &settings()).unwrap()
    }

    #[test]
    fn test_start_is_taken_literally() {
        let w = window("2024-03-10", "14:00", Some(50));
        assert_eq!(w.start_local, "2024-03-10T14:00:00");
        assert_eq!(w.end_local, "2024-03-10T14:50:00");
        assert_eq!(w.time_zone, "America/Sao_Paulo");
        assert!(!w.start_local.ends_with('Z'));
    }

    #[test]
    fn test_end_rolls_over_day_month_and_year() {
        assert_eq!(window("2024-01-31", "23:45", Some(30)).end_local, "2024-02-01T00:15:00");
        assert_eq!(window("2024-05-10", "23:40", Some(70)).end_local, "2024-05-11T00:50:00");
        assert_eq!(window("2023-12-31", "23:30", Some(60)).end_local, "2024-01-01T00:30:00");
    }

    #[test]
    fn test_leap_year_boundaries() {
        assert_eq!(window("2024-02-28", "23:50", Some(20)).end_local, "2024-02-29T00:10:00");
        assert_eq!(window("2023-02-28", "23:50", Some(20)).end_local, "2023-03-01T00:10:00");
    }

    #[test]
    fn test_missing_or_zero_duration_uses_default() {
        assert_eq!(window("2024-03-10", "09:00", None).end_local, "2024-03-10T09:50:00");
        assert_eq!(window("2024-03-10", "09:00", Some(0)).end_local, "2024-03-10T09:50:00");
    }

    #[test]
    fn test_end_is_exactly_duration_after_start() {
        for minutes in [1u32, 15, 50, 59, 61, 24 * 60, 3 * 24 * 60 + 7] {
            let w = window("2024-12-31", "22:13", Some(minutes));
            let start = parse_local(&w.start_local).unwrap();
            let end = parse_local(&w.end_local).unwrap();
            assert_eq!((end - start).num_minutes(), i64::from(minutes));
        }
    }

    #[test]
    fn test_end_past_last_date_is_rejected() {
        let last_day = NaiveDate::MAX;
        let late = NaiveTime::from_hms_opt(23, 0, 0).unwrap();

        let result = schedule_window(last_day, late, Some(u32::MAX), &settings());
        assert!(matches!(result, Err(AppointmentError::ValidationError(msg)) if msg.contains("durationMinutes")));

        let result = schedule_window(last_day, late, Some(61), &settings());
        assert!(matches!(result, Err(AppointmentError::ValidationError(_))));

        assert!(schedule_window(last_day, late, Some(59), &settings()).is_ok());
    }

    #[test]
    fn test_parsing() {
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("10/03/2024").is_none());
        assert!(parse_time("24:00").is_none());
        assert_eq!(parse_time("07:05:42"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(
            parse_local("2024-03-10T14:00:00-03:00"),
            parse_local("2024-03-10T14:00:00")
        );
    }

    #[test]
    fn test_summary_and_description() {
        let fields = AppointmentFields {
            patient_name: "Maria".to_string(),
            treatment: "Pilates".to_string(),
            notes: "Dor lombar".to_string(),
            professional: "Ana".to_string(),
            vip: true,
            ..Default::default()
        };

        assert_eq!(event_summary(&fields), "⭐ VIP Maria – Pilates");
        assert_eq!(event_description(&fields), "Observação: Dor lombar\nProfissional: Ana");

        let plain = AppointmentFields { patient_name: "João".to_string(), ..Default::default() };
        assert_eq!(event_summary(&plain), "João");
        assert_eq!(event_description(&plain), "");
    }

    #[test]
    fn test_write_fields_persists_tag_and_optional_key() {
        let fields = AppointmentFields {
            patient_name: "Maria".to_string(),
            attendance_status: AttendanceStatus::Attended,
            ..Default::default()
        };
        let private = write_fields(&fields);
        assert_eq!(private.get(keys::ATTENDANCE_STATUS).map(String::as_str), Some("ATENDIDO"));
        assert_eq!(private.get(keys::VIP).map(String::as_str), Some("false"));
        assert!(!private.contains_key(keys::IDEMPOTENCY_KEY));

        let keyed = AppointmentFields { idempotency_key: Some("k1".to_string()), ..fields };
        assert_eq!(write_fields(&keyed).get(keys::IDEMPOTENCY_KEY).map(String::as_str), Some("k1"));
    }
}
