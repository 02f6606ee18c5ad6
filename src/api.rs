//! HTTP surface: `POST /send-email`, CORS preflight, and `GET /health`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::allows_any_origin;
use crate::error::Error;
use crate::mail::MailTransport;
use crate::quote::{Composer, validate};

/// JSON body of every `/send-email` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<Composer>,
    pub transport: Arc<dyn MailTransport>,
}

/// Build the relay router with CORS for the given origins (`*` allows any).
///
/// Request bodies are not size-limited.
pub fn relay_routes(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(preflight_no_content))
                .layer(cors_layer(allowed_origins)),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allows_any_origin(allowed_origins) {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring unusable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Answer preflights with `204 No Content` instead of the CORS layer's `200`.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quote-relay"
    }))
}

// ── Send ────────────────────────────────────────────────────────────────

/// Validate, compose, and make exactly one delivery attempt.
async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RelayResponse>, Error> {
    let request_id = Uuid::new_v4();

    let Json(payload) = payload.map_err(|rejection| {
        warn!(%request_id, error = %rejection.body_text(), "Rejected quote request body");
        Error::BadRequest(rejection.body_text())
    })?;

    let fields = validate(&payload).inspect_err(|e| {
        warn!(%request_id, error = %e, "Quote request failed validation");
    })?;
    info!(%request_id, name = %fields.name, email = %fields.email, "Quote request received");

    let message = state.composer.compose(&fields);
    let transport = Arc::clone(&state.transport);
    tokio::task::spawn_blocking(move || transport.deliver(&message))
        .await
        .map_err(|e| {
            error!(%request_id, error = %e, "Delivery task failed");
            Error::Internal
        })?
        .inspect_err(|e| {
            warn!(%request_id, category = e.category(), "Quote request delivery failed");
        })?;

    info!(%request_id, "Quote request relayed");
    Ok(Json(RelayResponse::ok()))
}
