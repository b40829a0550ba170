//! HTTP surface: `GET /api/proxy` and a health probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::proxy::{ProxyQuery, ProxyService};

pub const PROXY_PATH: &str = "/api/proxy";
pub const HEALTH_PATH: &str = "/health";

pub fn router(proxy: Arc<ProxyService>) -> Router {
    Router::new()
        .route(PROXY_PATH, get(proxy_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(proxy)
}

/// Serves the router on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    proxy: Arc<ProxyService>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, mock_mode = proxy.is_mock_mode(), "Proxy listening");

    axum::serve(listener, router(proxy))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Proxy stopped");
    Ok(())
}

async fn proxy_handler(
    State(proxy): State<Arc<ProxyService>>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    match proxy.handle(&query).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            warn!(endpoint = ?query.endpoint, "Rejected proxy request: {e}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn health_handler(State(proxy): State<Arc<ProxyService>>) -> Response {
    Json(json!({ "status": "ok", "mock_mode": proxy.is_mock_mode() })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use kalium_common::config::Config;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(ProxyService::with_http(Arc::new(Config::default()))))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_scans_endpoint() {
        let (status, body) = get_json("/api/proxy?endpoint=scans").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["total"].is_u64());
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_bad_request() {
        let (status, body) = get_json("/api/proxy?endpoint=nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid endpoint"}));
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_bad_request() {
        let (status, body) = get_json("/api/proxy").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No endpoint specified"}));
    }

    #[tokio::test]
    async fn test_health_reports_mock_mode() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "mock_mode": true}));
    }
}
