// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Every calendar operation requires a signed-in practitioner
    let protected_routes = Router::new()
        .route(
            "/events",
            get(handlers::list_events)
                .post(handlers::create_event)
                .put(handlers::update_event),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
