use shared_calendar::CalendarEvent;

use crate::models::{
    keys, AppointmentFields, AttendanceStatus, ProjectedEvent, ProjectedFields, FALLBACK_TITLE,
};

/// Reads the typed appointment fields out of a stored event.
///
/// Missing properties become empty strings; the patient name falls back to
/// the event summary so events created directly in the calendar still show.
pub fn read_fields(event: &CalendarEvent) -> AppointmentFields {
    let private = event.private_properties();
    let get = |key: &str| {
        private
            .and_then(|props| props.get(key))
            .map(|value| value.to_string())
            .unwrap_or_default()
    };

    let patient_name = Some(get(keys::PATIENT_NAME))
        .filter(|name| !name.is_empty())
        .or_else(|| event.summary.clone())
        .unwrap_or_default();

    let attendance_raw = private.and_then(|props| {
        props
            .get(keys::ATTENDANCE_STATUS)
            .or_else(|| props.get(keys::LEGACY_ATTENDANCE_STATUS))
    });

    AppointmentFields {
        patient_name,
        age: get(keys::AGE),
        treatment: get(keys::TREATMENT),
        notes: get(keys::NOTES),
        professional: get(keys::PROFESSIONAL),
        vip: get(keys::VIP) == "true",
        attendance_status: attendance_raw
            .map(|raw| AttendanceStatus::normalize(raw))
            .unwrap_or_default(),
        idempotency_key: private
            .and_then(|props| props.get(keys::IDEMPOTENCY_KEY))
            .cloned(),
    }
}

pub fn event_title(fields: &AppointmentFields) -> String {
    let name = if fields.patient_name.is_empty() {
        FALLBACK_TITLE
    } else {
        fields.patient_name.as_str()
    };

    if fields.vip {
        format!("⭐ {}", name)
    } else {
        name.to_string()
    }
}

pub fn project_event(event: &CalendarEvent) -> ProjectedEvent {
    let fields = read_fields(event);
    let when = |slot: &Option<shared_calendar::EventDateTime>| {
        slot.as_ref()
            .and_then(|dt| dt.as_str())
            .unwrap_or_default()
            .to_string()
    };

    ProjectedEvent {
        id: event.id.clone().unwrap_or_default(),
        title: event_title(&fields),
        start: when(&event.start),
        end: when(&event.end),
        color: fields.attendance_status.color().to_string(),
        extended_props: ProjectedFields {
            attendance_label: fields.attendance_status.label().to_string(),
            attendance_status: fields.attendance_status,
            patient_name: fields.patient_name,
            age: fields.age,
            treatment: fields.treatment,
            notes: fields.notes,
            professional: fields.professional,
            vip: fields.vip,
        },
    }
}

pub fn project_events(events: &[CalendarEvent]) -> Vec<ProjectedEvent> {
    events.iter().map(project_event).collect()
}
