use std::sync::Arc;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, SlotStartPolicySetting};
use shared_models::auth::UserToken;

pub struct TestConfig {
    pub backend_url: String,
    pub slot_start_policy: SlotStartPolicySetting,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:4000".to_string(),
            slot_start_policy: SlotStartPolicySetting::Legacy,
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            port: 0,
            slot_start_policy: self.slot_start_policy,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn test_token() -> UserToken {
    UserToken::new("test-session-token")
}

/// Backend-shaped id (24 hex chars, like the ids the backend hands out).
pub fn backend_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn doctor(id: &str, name: &str, speciality: &str, slots_booked: Value) -> Value {
        json!({
            "_id": id,
            "name": name,
            "email": format!("{}@example.com", id),
            "image": "https://example.com/doctor.png",
            "speciality": speciality,
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Committed to delivering comprehensive medical care.",
            "available": true,
            "fees": 50,
            "address": {
                "line1": "17th Cross, Richmond",
                "line2": "Circle, Ring Road, London"
            },
            "date": Utc::now().timestamp_millis(),
            "slots_booked": slots_booked
        })
    }

    pub fn doctor_list(doctors: Vec<Value>) -> Value {
        json!({
            "success": true,
            "doctors": doctors
        })
    }

    pub fn appointment(
        id: &str,
        doc_id: &str,
        slot_date: &str,
        slot_time: &str,
        amount: f64,
        cancelled: bool,
        is_completed: bool,
    ) -> Value {
        json!({
            "_id": id,
            "userId": "patient-1",
            "docId": doc_id,
            "slotDate": slot_date,
            "slotTime": slot_time,
            "userData": {
                "name": "Test Patient",
                "email": "patient@example.com"
            },
            "docData": {
                "name": "Dr. Richard James",
                "speciality": "General physician",
                "image": "https://example.com/doctor.png",
                "address": "57th Cross, Richmond"
            },
            "amount": amount,
            "date": Utc::now().timestamp_millis(),
            "cancelled": cancelled,
            "payment": false,
            "isCompleted": is_completed
        })
    }

    pub fn appointment_list(appointments: Vec<Value>) -> Value {
        json!({
            "success": true,
            "appointments": appointments
        })
    }

    pub fn success(message: &str) -> Value {
        json!({
            "success": true,
            "message": message
        })
    }

    pub fn failure(message: &str) -> Value {
        json!({
            "success": false,
            "message": message
        })
    }
}
