use anyhow::Result;
use reqwest::Method;
use tracing::debug;

use shared_backend::{ApiReply, BackendClient};
use shared_config::AppConfig;

use crate::models::{Doctor, DoctorListPayload};

pub struct DoctorService {
    backend: BackendClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Fetch every doctor, including their booked-slot maps.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor list");

        let reply: ApiReply<DoctorListPayload> = self
            .backend
            .request(Method::GET, "/api/doctor/list", None, None)
            .await?;

        let payload = reply.into_result()?;
        let received = payload.doctors.len();
        let doctors = payload.into_doctors();
        debug!("Fetched {} doctors ({} skipped)", doctors.len(), received - doctors.len());

        Ok(doctors)
    }
}
