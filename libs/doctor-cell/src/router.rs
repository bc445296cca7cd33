use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers::{self, DoctorState};
use crate::services::availability::Clock;
use crate::services::directory::DoctorDirectory;

pub fn doctor_routes(config: Arc<AppConfig>, directory: Arc<DoctorDirectory>) -> Router {
    routes_with_state(DoctorState::new(config, directory))
}

pub fn doctor_routes_with_clock(
    config: Arc<AppConfig>,
    directory: Arc<DoctorDirectory>,
    clock: Clock,
) -> Router {
    routes_with_state(DoctorState::with_clock(config, directory, clock))
}

fn routes_with_state(state: DoctorState) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/refresh", post(handlers::refresh_doctors))
        .route("/{doc_id}", get(handlers::get_doctor))
        .route("/{doc_id}/slots", get(handlers::get_doctor_slots))
        .route("/{doc_id}/related", get(handlers::get_related_doctors))
        .with_state(Arc::new(state))
}
