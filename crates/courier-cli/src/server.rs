//! HTTP surface for the relay

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use courier_core::dispatch::ERR_INVALID_TOKEN;
use courier_core::{Dispatcher, RelayResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

pub const SEND_ROUTE: &str = "/api/courier/send-email";

#[derive(Deserialize)]
struct SubmissionBody {
    #[serde(default)]
    mail: Value,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    configured: bool,
}

/// The raw string the pipeline works on. Clients normally post the wire
/// string itself; an envelope posted as a JSON object is re-serialized and
/// base64-wrapped into the same shape.
fn raw_submission(mail: &Value) -> Option<String> {
    match mail {
        Value::String(raw) => Some(raw.clone()),
        Value::Object(_) => Some(STANDARD.encode(mail.to_string())),
        _ => None,
    }
}

async fn send_email(
    State(dispatcher): State<Arc<Dispatcher>>,
    payload: Result<Json<SubmissionBody>, JsonRejection>,
) -> (StatusCode, Json<RelayResponse>) {
    let raw = match payload {
        Ok(Json(body)) => raw_submission(&body.mail),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable request body");
            None
        }
    };

    let Some(raw) = raw else {
        return (
            StatusCode::BAD_REQUEST,
            Json(RelayResponse::rejected(ERR_INVALID_TOKEN)),
        );
    };

    let outcome = dispatcher.submit(&raw).await;
    let status =
        StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.response()))
}

async fn health(State(dispatcher): State<Arc<Dispatcher>>) -> Json<Health> {
    tracing::debug!(seen = dispatcher.guard().len(), "health check");
    Json(Health {
        status: "ok",
        configured: dispatcher.is_configured(),
    })
}

/// Build the relay router. Used by `courier serve` and the tests below.
pub fn build_router(dispatcher: Arc<Dispatcher>) -> Router {
    // Submissions come straight from browser front-ends
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(SEND_ROUTE, post(send_email))
        .route("/health", get(health))
        .layer(cors)
        .with_state(dispatcher)
}
