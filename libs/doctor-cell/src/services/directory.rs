use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::Doctor;
use crate::services::doctor::DoctorService;

/// In-memory copy of the backend's doctor list.
///
/// Shared through `Arc` by the routers that need it. Mutated only through
/// [`replace_all`](Self::replace_all) and [`refresh`](Self::refresh).
#[derive(Debug, Default)]
pub struct DoctorDirectory {
    doctors: RwLock<Option<Vec<Doctor>>>,
}

impl DoctorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctors(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: RwLock::new(Some(doctors)),
        }
    }

    pub async fn replace_all(&self, doctors: Vec<Doctor>) {
        *self.doctors.write().await = Some(doctors);
    }

    /// Re-fetches the doctor list, returning how many doctors were loaded.
    pub async fn refresh(&self, service: &DoctorService) -> Result<usize> {
        let doctors = service.list_doctors().await?;
        let count = doctors.len();
        self.replace_all(doctors).await;
        info!("Doctor directory refreshed with {} doctors", count);
        Ok(count)
    }

    pub async fn ensure_loaded(&self, service: &DoctorService) -> Result<()> {
        if self.is_loaded().await {
            return Ok(());
        }
        debug!("Doctor directory empty, loading");
        self.refresh(service).await.map(|_| ())
    }

    pub async fn is_loaded(&self) -> bool {
        self.doctors.read().await.is_some()
    }

    pub async fn all(&self) -> Vec<Doctor> {
        self.doctors.read().await.clone().unwrap_or_default()
    }

    pub async fn find(&self, doctor_id: &str) -> Option<Doctor> {
        self.doctors
            .read()
            .await
            .as_ref()?
            .iter()
            .find(|doctor| doctor.id == doctor_id)
            .cloned()
    }

    pub async fn by_speciality(&self, speciality: &str) -> Vec<Doctor> {
        self.filtered(|doctor| doctor.speciality.eq_ignore_ascii_case(speciality))
            .await
    }

    /// Doctors sharing the given doctor's speciality, excluding that doctor.
    pub async fn related(&self, doctor_id: &str) -> Vec<Doctor> {
        let Some(doctor) = self.find(doctor_id).await else {
            return Vec::new();
        };

        self.filtered(|other| {
            other.id != doctor.id && other.speciality.eq_ignore_ascii_case(&doctor.speciality)
        })
        .await
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Doctor>
    where
        F: Fn(&Doctor) -> bool,
    {
        self.doctors
            .read()
            .await
            .iter()
            .flatten()
            .filter(|doctor| predicate(*doctor))
            .cloned()
            .collect()
    }
}
