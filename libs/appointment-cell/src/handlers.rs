// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{Days, NaiveDateTime};
use serde_json::{json, Value};
use tracing::{debug, warn};

use doctor_cell::models::{DateKey, DaySlots, Doctor, SlotSchedule};
use doctor_cell::services::{
    availability::{compute_day_slots, system_clock, Clock},
    directory::DoctorDirectory,
    doctor::DoctorService,
};
use shared_config::AppConfig;
use shared_models::auth::UserToken;
use shared_models::error::AppError;

use crate::models::{AppointmentError, AppointmentQuery, BookSlotRequest};
use crate::services::{booking::BookingService, listing, session::BookingSession};

/// Where the client goes after a successful booking.
pub const APPOINTMENTS_PATH: &str = "/appointments";

pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub directory: Arc<DoctorDirectory>,
    pub schedule: SlotSchedule,
    pub clock: Clock,
}

impl AppointmentState {
    pub fn new(config: Arc<AppConfig>, directory: Arc<DoctorDirectory>) -> Self {
        Self::with_clock(config, directory, system_clock())
    }

    pub fn with_clock(config: Arc<AppConfig>, directory: Arc<DoctorDirectory>, clock: Clock) -> Self {
        let schedule = SlotSchedule::from_config(&config);
        Self {
            config,
            directory,
            schedule,
            clock,
        }
    }

    /// Booked slots live on the backend; re-read them after anything that changes them.
    async fn refresh_doctors(&self) {
        if let Err(e) = self.directory.refresh(&DoctorService::new(&self.config)).await {
            warn!("Doctor directory refresh failed: {}", e);
        }
    }

    async fn slots_for(&self, doc_id: &str, now: NaiveDateTime) -> (Option<Doctor>, DaySlots) {
        let doctor = self.directory.find(doc_id).await;
        let slots = compute_day_slots(doctor.as_ref(), now, &self.schedule);
        (doctor, slots)
    }
}

/// A time missing from the offered slots because the doctor already holds it is a conflict.
fn explain_unoffered(
    err: AppointmentError,
    doctor: Option<&Doctor>,
    now: NaiveDateTime,
    day_index: usize,
) -> AppointmentError {
    let AppointmentError::TimeNotOffered { time } = err else {
        return err;
    };

    let taken = doctor
        .zip(now.date().checked_add_days(Days::new(day_index as u64)))
        .is_some_and(|(doctor, date)| doctor.is_booked(&DateKey::from(date), &time));

    if taken {
        AppointmentError::SlotTaken { time }
    } else {
        AppointmentError::TimeNotOffered { time }
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(token): Extension<UserToken>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .directory
        .ensure_loaded(&DoctorService::new(&state.config))
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let now = (state.clock)();
    let (doctor, slots) = state.slots_for(&request.doc_id, now).await;

    let mut session = BookingSession::new(slots);
    session.select_day(request.day_index)?;
    session
        .select_time(&request.slot_time)
        .map_err(|e| explain_unoffered(e, doctor.as_ref(), now, request.day_index))?;

    let confirmation = BookingService::new(&state.config)
        .submit(&session, &request.doc_id, Some(&token))
        .await?;

    state.refresh_doctors().await;

    let (_, refreshed) = state.slots_for(&request.doc_id, now).await;
    session.reconcile(refreshed);
    if session.selected_time().is_some() {
        debug!(
            "Refreshed directory still offers {} for doctor {}",
            request.slot_time, request.doc_id
        );
    }

    Ok(Json(json!({
        "success": true,
        "message": confirmation.message,
        "redirect": APPOINTMENTS_PATH,
        "days": session.slots().views()
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(token): Extension<UserToken>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = BookingService::new(&state.config)
        .list_appointments(&token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    let appointments = listing::apply(&appointments, &query);

    Ok(Json(json!({
        "success": true,
        "total": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(token): Extension<UserToken>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let confirmation = BookingService::new(&state.config)
        .cancel_appointment(&appointment_id, &token)
        .await?;

    state.refresh_doctors().await;

    Ok(Json(json!({
        "success": true,
        "message": confirmation.message
    })))
}
