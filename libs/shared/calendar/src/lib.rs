pub mod google;
pub mod models;
pub mod store;

pub use google::GoogleCalendarClient;
pub use models::{CalendarEvent, CalendarError, EventDateTime, ExtendedProperties, TimeRange};
pub use store::CalendarStore;
