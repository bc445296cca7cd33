// libs/appointment-cell/tests/integration_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes_with_clock;
use doctor_cell::models::DateKey;
use doctor_cell::services::DoctorDirectory;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 5)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

fn create_test_app(mock_server: &MockServer, directory: Arc<DoctorDirectory>) -> Router {
    appointment_routes_with_clock(
        TestConfig::with_backend(&mock_server.uri()).to_arc(),
        directory,
        Arc::new(fixed_now),
    )
}

async fn send(app: Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_book_then_refresh_picks_up_new_booking() {
    let mock_server = MockServer::start().await;

    // First list load, then the refreshed list after booking.
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({})),
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({
                "6_3_2025": ["11:00 AM"]
            })),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .and(body_json(json!({"docId": "doc1", "slotDate": "6_3_2025", "slotTime": "11:00 AM"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::success("Appointment Booked")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = Arc::new(DoctorDirectory::new());
    let app = create_test_app(&mock_server, directory.clone());

    let (status, body) = send(
        app,
        "POST",
        "/book",
        Some("session-1"),
        Some(json!({"doc_id": "doc1", "day_index": 1, "slot_time": "11:00 AM"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Appointment Booked");
    assert_eq!(body["redirect"], "/appointments");

    let tomorrow: Vec<&str> = body["days"][1]["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["time"].as_str().unwrap())
        .collect();
    assert!(tomorrow.contains(&"10:30 AM"));
    assert!(!tomorrow.contains(&"11:00 AM"));

    let doctor = directory.find("doc1").await.unwrap();
    assert!(doctor.is_booked(&DateKey::from_ymd(2025, 3, 6).unwrap(), "11:00 AM"));
}

#[tokio::test]
async fn test_book_without_token_is_unauthorized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::success("Appointment Booked")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server, Arc::new(DoctorDirectory::new()));

    let (status, body) = send(
        app,
        "POST",
        "/book",
        None,
        Some(json!({"doc_id": "doc1", "day_index": 0, "slot_time": "10:00 AM"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_book_booked_time_is_rejected_before_backend() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({
                "5_3_2025": ["2:30 PM"]
            })),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::success("Appointment Booked")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server, Arc::new(DoctorDirectory::new()));

    let (status, body) = send(
        app,
        "POST",
        "/book",
        Some("session-1"),
        Some(json!({"doc_id": "doc1", "day_index": 0, "slot_time": "2:30 PM"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("2:30 PM"));
}

#[tokio::test]
async fn test_book_time_outside_hours_is_a_validation_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({})),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server, Arc::new(DoctorDirectory::new()));

    let (status, body) = send(
        app,
        "POST",
        "/book",
        Some("session-1"),
        Some(json!({"doc_id": "doc1", "day_index": 0, "slot_time": "9:00 PM"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not an available slot"));
}

#[tokio::test]
async fn test_backend_rejection_message_reaches_client() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![
            MockBackendResponses::doctor("doc1", "Dr. Richard James", "General physician", json!({})),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/book-appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::failure("Doctor Not Available")))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server, Arc::new(DoctorDirectory::new()));

    let (status, body) = send(
        app,
        "POST",
        "/book",
        Some("session-1"),
        Some(json!({"doc_id": "doc1", "day_index": 0, "slot_time": "10:00 AM"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Doctor Not Available");
}

#[tokio::test]
async fn test_list_appointments_filters_and_sorts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::appointment_list(vec![
            MockBackendResponses::appointment("a1", "doc1", "6_3_2025", "10:00 AM", 40.0, false, false),
            MockBackendResponses::appointment("a2", "doc1", "5_3_2025", "2:30 PM", 80.0, true, false),
            MockBackendResponses::appointment("a3", "doc1", "5_3_2025", "10:30 AM", 60.0, false, false),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server, Arc::new(DoctorDirectory::new()));

    let (status, body) = send(
        app,
        "GET",
        "/?sort_key=amount&direction=asc&status=active",
        Some("session-1"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["appointments"][0]["_id"], "a1");
    assert_eq!(body["appointments"][1]["_id"], "a3");
}

#[tokio::test]
async fn test_cancel_refreshes_directory() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/cancel-appointment"))
        .and(body_json(json!({"appointmentId": "a1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::success("Appointment Cancelled")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::doctor_list(vec![])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = Arc::new(DoctorDirectory::new());
    let app = create_test_app(&mock_server, directory.clone());

    let (status, body) = send(app, "POST", "/a1/cancel", Some("session-1"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment Cancelled");
    assert!(directory.is_loaded().await);
}
