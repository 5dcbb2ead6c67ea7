//! HTTP API routes
//!
//! Defines the relay endpoint and a status endpoint.

use crate::constants::api::RELAY_PATH;
use crate::constants::relay::{SENT, TEXT_REQUIRED, UPSTREAM_UNREACHABLE};
use crate::error::Error;
use crate::server::state::AppState;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(RELAY_PATH, post(relay_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Relay request body
#[derive(Debug, Deserialize)]
struct RelayBody {
    #[serde(default)]
    text: Option<String>,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    status: Option<u16>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status: Some(status.as_u16()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self
            .status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        (status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Error::Http(_) | Error::Relay { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError::new(status, err.to_string(), code)
    }
}

/// Successful relay response
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    pub message: String,
    pub data: serde_json::Value,
}

/// Upstream rejection, passed through with the upstream status
#[derive(Debug, Serialize, Deserialize)]
pub struct UpstreamRejection {
    pub error: String,
    pub telegram_response: serde_json::Value,
}

/// Relay a text message to the configured chat
///
/// POST /api/geofence
async fn relay_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let text = serde_json::from_slice::<RelayBody>(&body)
        .ok()
        .and_then(|b| b.text)
        .filter(|t| !t.is_empty());

    let Some(text) = text else {
        return ApiError::new(StatusCode::BAD_REQUEST, TEXT_REQUIRED, "TEXT_REQUIRED")
            .into_response();
    };

    if !state.telegram.is_configured() {
        return ApiError::from(Error::Config(
            "telegram.bot_token and telegram.chat_id must be set".to_string(),
        ))
        .into_response();
    }

    match state.telegram.send_message(&text).await {
        Ok(reply) if reply.ok => {
            info!(status = reply.status, "Telegram message sent");
            (
                StatusCode::OK,
                Json(RelayResponse {
                    message: SENT.to_string(),
                    data: reply.body,
                }),
            )
                .into_response()
        }
        Ok(reply) => {
            warn!(status = reply.status, "Telegram API rejected message");
            let status =
                StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let error = reply
                .description()
                .unwrap_or("Failed to send Telegram message")
                .to_string();
            (
                status,
                Json(UpstreamRejection {
                    error,
                    telegram_response: reply.body,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Error sending message to Telegram");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                UPSTREAM_UNREACHABLE,
                "UPSTREAM_ERROR",
            )
            .into_response()
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Whether relay requests can reach a chat
    pub telegram_configured: bool,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        telegram_configured: state.telegram.is_configured(),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    fn create_test_state(api_url: &str) -> Arc<AppState> {
        let mut config = Config::default();
        config.telegram.api_url = api_url.to_string();
        config.telegram.bot_token = "test-token".to_string();
        config.telegram.chat_id = "42".to_string();
        Arc::new(AppState::new(&config).unwrap())
    }

    /// Fake Telegram Bot API that records requests and answers with `status`
    async fn spawn_fake_telegram(
        status: StatusCode,
        reply: serde_json::Value,
    ) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/bottest-token/sendMessage",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    (status, Json(reply))
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), received)
    }

    fn relay_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/geofence")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert!(status.telegram_configured);
    }

    #[tokio::test]
    async fn test_relay_requires_post() {
        let app = create_router(create_test_state("http://127.0.0.1:9"));

        let response = app
            .oneshot(Request::builder().uri("/api/geofence").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_relay_missing_text() {
        for body in ["{}", r#"{"text": ""}"#, "not json"] {
            let app = create_router(create_test_state("http://127.0.0.1:9"));
            let response = app.oneshot(relay_request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = json_body(response).await;
            assert_eq!(json["error"], TEXT_REQUIRED);
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_whitespace_text() {
        let (api_url, received) = spawn_fake_telegram(
            StatusCode::OK,
            serde_json::json!({ "ok": true, "result": {} }),
        )
        .await;
        let app = create_router(create_test_state(&api_url));

        let response = app
            .oneshot(relay_request(r#"{"text": " "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(received.lock().unwrap()[0]["text"], " ");
    }

    #[tokio::test]
    async fn test_relay_unconfigured() {
        let state = Arc::new(AppState::new(&Config::default()).unwrap());
        let app = create_router(state);

        let response = app
            .oneshot(relay_request(r#"{"text": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["code"], "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_relay_forwards_to_telegram() {
        let (api_url, received) = spawn_fake_telegram(
            StatusCode::OK,
            serde_json::json!({ "ok": true, "result": { "message_id": 7 } }),
        )
        .await;
        let app = create_router(create_test_state(&api_url));

        let response = app
            .oneshot(relay_request(r#"{"text": "🔔 entered"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["message"], SENT);
        assert_eq!(json["data"]["result"]["message_id"], 7);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0],
            serde_json::json!({ "chat_id": "42", "text": "🔔 entered", "parse_mode": "Markdown" })
        );
    }

    #[tokio::test]
    async fn test_relay_passes_through_upstream_rejection() {
        let (api_url, _) = spawn_fake_telegram(
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "ok": false, "description": "Bad Request: chat not found" }),
        )
        .await;
        let app = create_router(create_test_state(&api_url));

        let response = app
            .oneshot(relay_request(r#"{"text": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Bad Request: chat not found");
        assert_eq!(json["telegram_response"]["ok"], false);
    }

    #[tokio::test]
    async fn test_relay_upstream_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let app = create_router(create_test_state(&format!("http://{}", addr)));

        let response = app
            .oneshot(relay_request(r#"{"text": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], UPSTREAM_UNREACHABLE);
    }
}
