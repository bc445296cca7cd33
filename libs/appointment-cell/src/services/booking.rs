// libs/appointment-cell/src/services/booking.rs
use anyhow::Result;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_backend::client::Acknowledgement;
use shared_backend::{ApiReply, BackendClient, BackendRejection};
use shared_config::AppConfig;
use shared_models::auth::UserToken;

use crate::models::{
    Appointment, AppointmentError, AppointmentListPayload, BookAppointmentRequest,
    BookingConfirmation,
};
use crate::services::session::BookingSession;

pub struct BookingService {
    backend: BackendClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Books the session's selection. Nothing is sent without a token and a
    /// complete selection. Failures are not retried.
    pub async fn submit(
        &self,
        session: &BookingSession,
        doc_id: &str,
        token: Option<&UserToken>,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let token = token.ok_or(AppointmentError::LoginRequired)?;
        let request = session.booking_request(doc_id)?;
        self.book(&request, token).await
    }

    pub async fn book(
        &self,
        request: &BookAppointmentRequest,
        token: &UserToken,
    ) -> Result<BookingConfirmation, AppointmentError> {
        info!(
            "Booking doctor {} on {} at {}",
            request.doc_id, request.slot_date, request.slot_time
        );

        let message = self
            .acknowledge("/api/user/book-appointment", json!(request), token)
            .await?;

        Ok(BookingConfirmation {
            message: message.unwrap_or_else(|| "Appointment Booked".to_string()),
        })
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: &str,
        token: &UserToken,
    ) -> Result<BookingConfirmation, AppointmentError> {
        info!("Cancelling appointment {}", appointment_id);

        let message = self
            .acknowledge(
                "/api/user/cancel-appointment",
                json!({ "appointmentId": appointment_id }),
                token,
            )
            .await?;

        Ok(BookingConfirmation {
            message: message.unwrap_or_else(|| "Appointment Cancelled".to_string()),
        })
    }

    /// The patient's appointments, most recently booked first.
    pub async fn list_appointments(&self, token: &UserToken) -> Result<Vec<Appointment>> {
        debug!("Fetching patient appointments");

        let reply: ApiReply<AppointmentListPayload> = self
            .backend
            .request(Method::GET, "/api/user/appointments", Some(token), None)
            .await?;

        let mut appointments = reply.into_result()?.appointments;
        appointments.reverse();
        Ok(appointments)
    }

    async fn acknowledge(
        &self,
        path: &str,
        body: Value,
        token: &UserToken,
    ) -> Result<Option<String>, AppointmentError> {
        let reply: ApiReply<Acknowledgement> = self
            .backend
            .request(Method::POST, path, Some(token), Some(body))
            .await
            .map_err(|e| match e.downcast::<BackendRejection>() {
                Ok(rejection) => {
                    warn!("Backend rejected {} ({}): {}", path, rejection.status, rejection.message);
                    AppointmentError::Rejected(rejection.message)
                }
                Err(e) => {
                    warn!("Request to {} failed: {}", path, e);
                    AppointmentError::Unreachable
                }
            })?;

        if reply.success {
            Ok(reply.message)
        } else {
            let message = reply
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            warn!("Backend rejected {}: {}", path, message);
            Err(AppointmentError::Rejected(message))
        }
    }
}
