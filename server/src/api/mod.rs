//! HTTP API.

mod currencies;
pub mod error;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::service::RateService;

pub use error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health(State(service): State<Arc<RateService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: service.state().as_str(),
    })
}

/// Build the application router.
pub fn router(service: Arc<RateService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", currencies::router())
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use coinrate_fx::{MockRateSource, RefresherConfig};
    use coinrate_registry::MemoryRegistry;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn health_of(service: Arc<RateService>) -> Value {
        let response = router(service)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_follows_lifecycle() {
        let service = Arc::new(RateService::new(
            Arc::new(MemoryRegistry::new()),
            Arc::new(MockRateSource::new("test")),
            RefresherConfig::default(),
            Duration::from_secs(120),
        ));

        assert_eq!(health_of(service.clone()).await, json!({"status": "starting"}));

        service.start().await.unwrap();
        assert_eq!(health_of(service.clone()).await, json!({"status": "running"}));

        service.stop().await;
        assert_eq!(health_of(service).await, json!({"status": "stopped"}));
    }
}
