use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::delivery::{self, SendOutcome};
use crate::event::WebhookEvent;
use crate::format;
use crate::telegram::MessageSender;

/// Shared application state: immutable config plus the outbound transport.
pub struct AppState {
    pub config: Config,
    pub sender: Arc<dyn MessageSender>,
}

enum ApiError {
    Unauthorized,
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Unauthorized"})),
            )
                .into_response(),
            ApiError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("{e:#}")})),
            )
                .into_response(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    #[serde(rename = "chatIds")]
    chat_ids: Vec<String>,
}

#[derive(Serialize)]
struct RelayResponse {
    ok: bool,
    sent: Vec<SendOutcome>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/telegram-webhook", post(relay_webhook))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Permissive CORS headers on every response; `OPTIONS` on any path is
/// answered with an empty 200 before routing or secret validation.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS, PUT, DELETE"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Origin, X-Requested-With, Content-Type, Accept, X-Secret"),
    );
    response
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Telegram webhook сервер працює",
        chat_ids: state.config.chat_ids.clone(),
    })
}

async fn relay_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<RelayResponse>, ApiError> {
    let presented = headers
        .get("x-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| params.get("secret").cloned());

    if presented.as_deref() != Some(state.config.secret.as_str()) {
        warn!("Rejected webhook with bad secret");
        return Err(ApiError::Unauthorized);
    }

    info!(
        "Received event: {}",
        payload.get("event").and_then(|v| v.as_str()).unwrap_or("(none)"),
    );

    let event = WebhookEvent::from_payload(&payload).map_err(|e| {
        ApiError::Internal(anyhow::Error::new(e).context("Failed to decode webhook payload"))
    })?;

    let message = format::render(&event);
    let sent = delivery::broadcast(state.sender.as_ref(), &state.config.chat_ids, &message).await;
    debug!("Delivery results: {:?}", sent);

    Ok(Json(RelayResponse { ok: true, sent }))
}

/// Bind the configured port and serve until shutdown.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
