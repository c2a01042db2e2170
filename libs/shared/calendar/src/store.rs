use async_trait::async_trait;

use crate::models::{CalendarError, CalendarEvent, TimeRange};

/// Read/write boundary to the external calendar of record.
///
/// Implementations are constructed explicitly and handed to whoever needs
/// them; nothing in the scheduling engine holds one.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Events overlapping `range`, recurring series expanded into instances.
    async fn list_events(&self, range: &TimeRange) -> Result<Vec<CalendarEvent>, CalendarError>;

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent, CalendarError>;

    async fn insert_event(&self, event: &CalendarEvent) -> Result<CalendarEvent, CalendarError>;

    /// Overwrites only the fields present in `patch`; `id` is preserved.
    async fn patch_event(
        &self,
        event_id: &str,
        patch: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError>;
}
