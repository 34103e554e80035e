use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct HealthState {
    registry: SessionRegistry,
    classifier_provider: &'static str,
}

impl HealthState {
    pub fn new(registry: SessionRegistry, classifier_provider: &'static str) -> Self {
        Self { registry, classifier_provider }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub classifier: HealthCheck,
    pub active_sessions: usize,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Always 200: without a classifier every reason is judged invalid, but the
/// service keeps answering.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let classifier = classifier_check(state.classifier_provider);
    let ready = classifier.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "haggle-server negotiation routes initialized".to_string(),
        },
        classifier,
        active_sessions: state.registry.len().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

fn classifier_check(provider: &'static str) -> HealthCheck {
    match provider {
        "offline" => HealthCheck {
            status: "degraded",
            detail: "classifier disabled: reasons are judged invalid and tone neutral".to_string(),
        },
        provider => HealthCheck { status: "ready", detail: format!("classifier provider `{provider}`") },
    }
}
