use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::DoctorDirectory;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>, directory: Arc<DoctorDirectory>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediBook booking gateway is running!" }))
        .nest("/doctors", doctor_routes(state.clone(), directory.clone()))
        .nest("/appointments", appointment_routes(state, directory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use shared_config::SlotStartPolicySetting;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = AppConfig {
            backend_url: "http://127.0.0.1:9".to_string(),
            port: 0,
            slot_start_policy: SlotStartPolicySetting::Legacy,
        };
        create_router(Arc::new(config), Arc::new(DoctorDirectory::new()))
    }

    #[tokio::test]
    async fn root_reports_running() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn appointments_are_nested_behind_the_token_check() {
        let response = app()
            .oneshot(Request::builder().uri("/appointments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }
}
