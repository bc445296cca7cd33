use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorError, DoctorListQuery, SlotSchedule};
use crate::services::{
    availability::{compute_day_slots, system_clock, Clock},
    directory::DoctorDirectory,
    doctor::DoctorService,
};

pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub directory: Arc<DoctorDirectory>,
    pub schedule: SlotSchedule,
    pub clock: Clock,
}

impl DoctorState {
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

    fn doctor_service(&self) -> DoctorService {
        DoctorService::new(&self.config)
    }

    async fn loaded_directory(&self) -> Result<&DoctorDirectory, DoctorError> {
        self.directory
            .ensure_loaded(&self.doctor_service())
            .await
            .map_err(|e| DoctorError::DirectoryUnavailable(e.to_string()))?;
        Ok(&self.directory)
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<DoctorState>>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = state.loaded_directory().await?;

    let doctors = match query.speciality.as_deref().map(str::trim) {
        Some(speciality) if !speciality.is_empty() => directory.by_speciality(speciality).await,
        _ => directory.all().await,
    };

    Ok(Json(json!({
        "success": true,
        "total": doctors.len(),
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = state.loaded_directory().await?;

    let doctor = directory
        .find(&doc_id)
        .await
        .ok_or(DoctorError::NotFound(doc_id))?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}

/// Slots for the booking page. An unknown doctor yields empty days, not an error.
#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(state): State<Arc<DoctorState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = state.loaded_directory().await?;
    let doctor = directory.find(&doc_id).await;
    if doctor.is_none() {
        debug!("No doctor {} in directory, returning empty slots", doc_id);
    }

    let now = (state.clock)();
    let slots = compute_day_slots(doctor.as_ref(), now, &state.schedule);

    Ok(Json(json!({
        "success": true,
        "doc_id": doc_id,
        "total_slots": slots.total_slots(),
        "days": slots.views()
    })))
}

#[axum::debug_handler]
pub async fn get_related_doctors(
    State(state): State<Arc<DoctorState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = state.loaded_directory().await?;
    let doctors = directory.related(&doc_id).await;

    Ok(Json(json!({
        "success": true,
        "total": doctors.len(),
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn refresh_doctors(
    State(state): State<Arc<DoctorState>>,
) -> Result<Json<Value>, AppError> {
    let total = state
        .directory
        .refresh(&state.doctor_service())
        .await
        .map_err(|e| DoctorError::DirectoryUnavailable(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "total": total
    })))
}
