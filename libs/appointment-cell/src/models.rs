// libs/appointment-cell/src/models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use doctor_cell::models::DateKey;
use doctor_cell::services::availability::parse_slot_time;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub doc_id: String,
    /// `D_M_YYYY` date key, kept as sent so malformed values still list.
    pub slot_date: String,
    pub slot_time: String,
    #[serde(default)]
    pub user_data: AppointmentParty,
    #[serde(default)]
    pub doc_data: AppointmentParty,
    #[serde(default)]
    pub amount: f64,
    /// When the booking was made, epoch milliseconds.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub payment: bool,
    #[serde(default)]
    pub is_completed: bool,
}

impl Appointment {
    pub fn status(&self) -> AppointmentStatus {
        if self.cancelled {
            AppointmentStatus::Cancelled
        } else if self.is_completed {
            AppointmentStatus::Completed
        } else {
            AppointmentStatus::Active
        }
    }

    /// Slot date and time combined, `None` when either fails to parse.
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        let key: DateKey = self.slot_date.parse().ok()?;
        let time = parse_slot_time(&self.slot_time)?;
        Some(key.date().and_time(time))
    }
}

/// Snapshot of the patient or doctor stored alongside the appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentParty {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub speciality: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Active => write!(f, "active"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// LIST QUERY
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Cancelled,
}

impl StatusFilter {
    pub fn admits(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == AppointmentStatus::Active,
            StatusFilter::Completed => status == AppointmentStatus::Completed,
            StatusFilter::Cancelled => status == AppointmentStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentQuery {
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub status: StatusFilter,
    pub search: Option<String>,
}

// ==============================================================================
// BOOKING REQUESTS
// ==============================================================================

/// Body sent to the backend's book-appointment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doc_id: String,
    pub slot_date: DateKey,
    pub slot_time: String,
}

/// What a client posts to book: a day from the slot listing and one of its times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotRequest {
    pub doc_id: String,
    pub day_index: usize,
    pub slot_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListPayload {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppointmentError {
    #[error("Login to book appointment")]
    LoginRequired,

    #[error("Select a day and a time to book")]
    SelectionIncomplete,

    #[error("No booking day at index {0}")]
    DayOutOfRange(usize),

    #[error("{time} is not an available slot on the selected day")]
    TimeNotOffered { time: String },

    #[error("No slots available on the selected day")]
    NoSlotsOnDay,

    #[error("{time} on the selected day has already been booked")]
    SlotTaken { time: String },

    /// Backend answered `success: false`; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    Unreachable,
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::LoginRequired => AppError::Auth(message),
            AppointmentError::SelectionIncomplete
            | AppointmentError::DayOutOfRange(_)
            | AppointmentError::TimeNotOffered { .. }
            | AppointmentError::NoSlotsOnDay => AppError::ValidationError(message),
            AppointmentError::SlotTaken { .. } => AppError::Conflict(message),
            AppointmentError::Rejected(_) => AppError::BadRequest(message),
            AppointmentError::Unreachable => AppError::ExternalService(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn appointment(slot_date: &str, slot_time: &str, cancelled: bool, is_completed: bool) -> Appointment {
        serde_json::from_value(json!({
            "_id": "a1",
            "docId": "doc1",
            "slotDate": slot_date,
            "slotTime": slot_time,
            "amount": 50,
            "cancelled": cancelled,
            "isCompleted": is_completed
        }))
        .unwrap()
    }

    #[test]
    fn status_prefers_cancelled() {
        assert_eq!(appointment("5_3_2025", "2:30 PM", true, true).status(), AppointmentStatus::Cancelled);
        assert_eq!(appointment("5_3_2025", "2:30 PM", false, true).status(), AppointmentStatus::Completed);
        assert_eq!(appointment("5_3_2025", "2:30 PM", false, false).status(), AppointmentStatus::Active);
    }

    #[test]
    fn scheduled_at_combines_date_and_time() {
        let at = appointment("5_3_2025", "2:30 PM", false, false).scheduled_at().unwrap();
        assert_eq!(at.to_string(), "2025-03-05 14:30:00");

        assert!(appointment("2025-03-05", "2:30 PM", false, false).scheduled_at().is_none());
        assert!(appointment("5_3_2025", "half past two", false, false).scheduled_at().is_none());
    }

    #[test]
    fn book_request_uses_wire_names() {
        let request = BookAppointmentRequest {
            doc_id: "doc1".into(),
            slot_date: DateKey::from_ymd(2025, 3, 5).unwrap(),
            slot_time: "2:30 PM".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"docId": "doc1", "slotDate": "5_3_2025", "slotTime": "2:30 PM"})
        );
    }

    #[test]
    fn taken_slot_is_a_conflict() {
        let err: AppError = AppointmentError::SlotTaken { time: "2:30 PM".into() }.into();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
        assert!(err.message().contains("2:30 PM"));
    }

    #[test]
    fn rejection_keeps_backend_message() {
        let err: AppError = AppointmentError::Rejected("Slot not available".into()).into();
        assert_eq!(err.message(), "Slot not available");
    }
}
