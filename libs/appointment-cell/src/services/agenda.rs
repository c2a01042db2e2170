// libs/appointment-cell/src/services/agenda.rs
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use shared_calendar::{
    CalendarEvent, CalendarStore, EventDateTime, ExtendedProperties, GoogleCalendarClient, TimeRange,
};
use shared_config::AppConfig;

use crate::models::{
    AppointmentChanges, AppointmentError, AppointmentFields, AppointmentInput, EventFilters,
    ProjectedEvent, ScheduleSettings, ScheduleWindow,
};
use crate::services::{
    filter::apply_filters,
    normalizer::{event_description, event_summary, parse_local, schedule_window, write_fields},
    projector::{project_event, project_events, read_fields},
    recurrence::{monthly_recurrence, recurrence_lines},
};

/// Request-scoped scheduling service: runs the engine between the HTTP
/// boundary and whichever calendar store it is handed.
pub struct AgendaService<S: CalendarStore> {
    store: S,
    settings: ScheduleSettings,
}

impl AgendaService<GoogleCalendarClient> {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        let client = GoogleCalendarClient::new(config)?;
        Ok(Self::new(client, ScheduleSettings::from_config(config)))
    }
}

impl<S: CalendarStore> AgendaService<S> {
    pub fn new(store: S, settings: ScheduleSettings) -> Self {
        Self { store, settings }
    }

    pub async fn list_events(
        &self,
        range: &TimeRange,
        filters: &EventFilters,
    ) -> Result<Vec<ProjectedEvent>, AppointmentError> {
        let stored = self.store.list_events(range).await?;
        let projected = project_events(&stored);
        let total = projected.len();

        let visible = apply_filters(projected, filters);
        debug!("Listed {} events, {} after filters", total, visible.len());

        Ok(visible)
    }

    pub async fn create_appointment(
        &self,
        input: AppointmentInput,
    ) -> Result<ProjectedEvent, AppointmentError> {
        let window = schedule_window(input.date, input.time, input.duration_minutes, &self.settings)?;
        let recurrence = monthly_recurrence(input.recurrence_months);

        debug!(
            "Creating appointment for {} at {} ({:?})",
            input.fields.patient_name, window.start_local, recurrence
        );

        let mut event = event_body(&input.fields, Some(&window));
        event.recurrence = recurrence_lines(recurrence);

        let created = self.store.insert_event(&event).await?;
        info!(
            "Appointment {} created for {}",
            created.id.as_deref().unwrap_or("<no id>"),
            window.start_local
        );

        Ok(project_event(&created))
    }

    /// Read-modify-write: fields left out of `changes` keep their stored value.
    pub async fn update_appointment(
        &self,
        changes: AppointmentChanges,
    ) -> Result<ProjectedEvent, AppointmentError> {
        let existing = self.store.get_event(&changes.id).await?;
        let window = if changes.reschedules() {
            Some(self.reschedule(&existing, &changes)?)
        } else {
            None
        };

        let fields = merge_fields(read_fields(&existing), &changes);
        let patch = event_body(&fields, window.as_ref());

        let updated = self.store.patch_event(&changes.id, &patch).await?;
        info!("Appointment {} updated", changes.id);

        Ok(project_event(&updated))
    }

    fn reschedule(
        &self,
        existing: &CalendarEvent,
        changes: &AppointmentChanges,
    ) -> Result<ScheduleWindow, AppointmentError> {
        let stored_start = local_slot(&existing.start);
        let stored_end = local_slot(&existing.end);

        let date = changes
            .date
            .or_else(|| stored_start.map(|start| start.date()))
            .ok_or_else(|| missing_for_reschedule("date"))?;
        let time = changes
            .time
            .or_else(|| stored_start.map(|start| start.time()))
            .ok_or_else(|| missing_for_reschedule("time"))?;

        let duration = changes.duration_minutes.or_else(|| {
            let (start, end) = (stored_start?, stored_end?);
            u32::try_from((end - start).num_minutes()).ok().filter(|m| *m > 0)
        });
        if duration.is_none() {
            warn!(
                "Appointment {} has no usable stored duration, using {} minutes",
                changes.id, self.settings.default_duration_minutes
            );
        }

        schedule_window(date, time, duration, &self.settings)
    }
}

fn local_slot(slot: &Option<EventDateTime>) -> Option<NaiveDateTime> {
    slot.as_ref()
        .and_then(|dt| dt.date_time.as_deref())
        .and_then(parse_local)
}

fn missing_for_reschedule(field: &str) -> AppointmentError {
    AppointmentError::ValidationError(format!(
        "Field '{}' is required to reschedule an event without a stored start time",
        field
    ))
}

fn merge_fields(mut fields: AppointmentFields, changes: &AppointmentChanges) -> AppointmentFields {
    let overwrite = |target: &mut String, value: &Option<String>| {
        if let Some(value) = value {
            target.clone_from(value);
        }
    };

    overwrite(&mut fields.patient_name, &changes.patient_name);
    overwrite(&mut fields.age, &changes.age);
    overwrite(&mut fields.treatment, &changes.treatment);
    overwrite(&mut fields.notes, &changes.notes);
    overwrite(&mut fields.professional, &changes.professional);

    if let Some(vip) = changes.vip {
        fields.vip = vip;
    }
    if let Some(status) = changes.attendance_status {
        fields.attendance_status = status;
    }

    fields
}

/// Summary, description and private properties, plus start/end when given.
fn event_body(fields: &AppointmentFields, window: Option<&ScheduleWindow>) -> CalendarEvent {
    CalendarEvent {
        summary: Some(event_summary(fields)),
        description: Some(event_description(fields)),
        start: window.map(|w| EventDateTime::local(w.start_local.as_str(), w.time_zone.as_str())),
        end: window.map(|w| EventDateTime::local(w.end_local.as_str(), w.time_zone.as_str())),
        extended_properties: Some(ExtendedProperties {
            private: Some(write_fields(fields)),
            shared: None,
        }),
        ..Default::default()
    }
}
