// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, CreateAppointmentRequest, EventQuery, UpdateAppointmentRequest,
};
use crate::services::agenda::AgendaService;

fn into_app_error(error: AppointmentError) -> AppError {
    match error {
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::NotFound(msg) => AppError::NotFound(format!("Event not found: {}", msg)),
        AppointmentError::NotConfigured => {
            AppError::Internal("Google Calendar is not configured".to_string())
        }
        AppointmentError::ExternalServiceError(msg) => AppError::ExternalService(msg),
    }
}

// ==============================================================================
// CALENDAR EVENT HANDLERS
// ==============================================================================

/// Events in `[from, to)` projected for the calendar view, narrowed by the
/// optional filters in the query string.
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Value>, AppError> {
    let range = query.time_range().map_err(into_app_error)?;
    let filters = query.filters();
    debug!("User {} listing events {:?} with {:?}", user.id, range, filters);

    let agenda = AgendaService::from_config(&state).map_err(into_app_error)?;
    let events = agenda
        .list_events(&range, &filters)
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "ok": true,
        "events": events
    })))
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = request.validate().map_err(into_app_error)?;
    debug!("User {} creating appointment on {} {}", user.id, input.date, input.time);

    let agenda = AgendaService::from_config(&state).map_err(into_app_error)?;
    let event = agenda
        .create_appointment(input)
        .await
        .map_err(into_app_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "event": event
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let changes = request.validate().map_err(into_app_error)?;
    debug!("User {} updating appointment {}", user.id, changes.id);

    let agenda = AgendaService::from_config(&state).map_err(into_app_error)?;
    let event = agenda
        .update_appointment(changes)
        .await
        .map_err(into_app_error)?;

    Ok(Json(json!({
        "ok": true,
        "event": event
    })))
}
