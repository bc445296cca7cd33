// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use doctor_cell::services::{availability::Clock, directory::DoctorDirectory};
use shared_config::AppConfig;
use shared_utils::extractor::token_middleware;

use crate::handlers::{self, AppointmentState};

pub fn appointment_routes(config: Arc<AppConfig>, directory: Arc<DoctorDirectory>) -> Router {
    routes_with_state(AppointmentState::new(config, directory))
}

pub fn appointment_routes_with_clock(
    config: Arc<AppConfig>,
    directory: Arc<DoctorDirectory>,
    clock: Clock,
) -> Router {
    routes_with_state(AppointmentState::with_clock(config, directory, clock))
}

fn routes_with_state(state: AppointmentState) -> Router {
    // Every appointment operation needs the patient's session token
    Router::new()
        .route("/", get(handlers::list_appointments))
        .route("/book", post(handlers::book_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn(token_middleware))
        .with_state(Arc::new(state))
}
