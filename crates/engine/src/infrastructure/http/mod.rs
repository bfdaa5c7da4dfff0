//! HTTP surface: the play endpoint plus a liveness probe.

pub mod play_routes;

use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::infrastructure::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/api/play", post(play_routes::play))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::store::MemoryBackend;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use storyloom_protocol::ActionResult;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let backend = Arc::new(MemoryBackend::new());
        let state = AppState::new(backend, AppConfig::for_tests())
            .await
            .expect("app state");
        router(Arc::new(state))
    }

    #[tokio::test]
    async fn test_health_responds_ok() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_play_endpoint_runs_a_batch() {
        let app = test_router().await;
        let body = r#"{"parallel": false, "requests": [{"action": "newSession"}]}"#;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/play")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let results: Vec<ActionResult> = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], ActionResult::NewSession { .. }));
    }
}
