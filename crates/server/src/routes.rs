//! Negotiation HTTP routes.
//!
//! Single-session endpoints (session id `default`):
//! - `POST /start-negotiation`
//! - `POST /propose-discount`
//! - `POST /accept-offer`
//! - `POST /reject-offer`
//!
//! Keyed endpoints:
//! - `POST /api/v1/sessions`                 start, mints a session id
//! - `GET  /api/v1/sessions/{id}`            snapshot
//! - `POST /api/v1/sessions/{id}/proposals`
//! - `POST /api/v1/sessions/{id}/accept`
//! - `POST /api/v1/sessions/{id}/reject`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use haggle_core::{
    ApplicationError, DomainError, InterfaceError, NegotiationOracle, NegotiationPolicy,
    NegotiationSession, OfferDecision, ProposalOutcome, ProposeRequest, SessionId,
    SessionSnapshot, SessionSummary, StartRequest,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct NegotiationState {
    registry: SessionRegistry,
    oracle: Arc<dyn NegotiationOracle>,
    policy: NegotiationPolicy,
}

impl NegotiationState {
    pub fn new(
        registry: SessionRegistry,
        oracle: Arc<dyn NegotiationOracle>,
        policy: NegotiationPolicy,
    ) -> Self {
        Self { registry, oracle, policy }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn from_domain(error: DomainError) -> Self {
        let interface = ApplicationError::from(error).into_interface(Uuid::new_v4().to_string());
        warn!(
            event_name = "negotiation.request.rejected",
            correlation_id = interface.correlation_id(),
            error = %interface,
            "negotiation request failed"
        );
        Self(interface)
    }

    fn malformed_body(rejection: JsonRejection) -> Self {
        Self::from_domain(DomainError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        };
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            detail: self.0.message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: NegotiationState) -> Router {
    Router::new()
        .route("/start-negotiation", post(start_default))
        .route("/propose-discount", post(propose_default))
        .route("/accept-offer", post(accept_default))
        .route("/reject-offer", post(reject_default))
        .route("/api/v1/sessions", post(start_keyed))
        .route("/api/v1/sessions/{id}", get(snapshot))
        .route("/api/v1/sessions/{id}/proposals", post(propose_keyed))
        .route("/api/v1/sessions/{id}/accept", post(accept_keyed))
        .route("/api/v1/sessions/{id}/reject", post(reject_keyed))
        .with_state(state)
}

async fn start_default(
    State(state): State<NegotiationState>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    start_session(&state, SessionId::default_session(), body).await
}

async fn start_keyed(
    State(state): State<NegotiationState>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    start_session(&state, SessionId::generate(), body).await
}

async fn propose_default(
    State(state): State<NegotiationState>,
    body: Result<Json<ProposeRequest>, JsonRejection>,
) -> Result<Json<ProposalOutcome>, ApiError> {
    propose(&state, SessionId::default_session(), body).await
}

async fn propose_keyed(
    State(state): State<NegotiationState>,
    Path(id): Path<String>,
    body: Result<Json<ProposeRequest>, JsonRejection>,
) -> Result<Json<ProposalOutcome>, ApiError> {
    propose(&state, SessionId(id), body).await
}

async fn accept_default(
    State(state): State<NegotiationState>,
) -> Result<Json<OfferDecision>, ApiError> {
    decide(&state, SessionId::default_session(), Decision::Accept).await
}

async fn accept_keyed(
    State(state): State<NegotiationState>,
    Path(id): Path<String>,
) -> Result<Json<OfferDecision>, ApiError> {
    decide(&state, SessionId(id), Decision::Accept).await
}

async fn reject_default(
    State(state): State<NegotiationState>,
) -> Result<Json<OfferDecision>, ApiError> {
    decide(&state, SessionId::default_session(), Decision::Reject).await
}

async fn reject_keyed(
    State(state): State<NegotiationState>,
    Path(id): Path<String>,
) -> Result<Json<OfferDecision>, ApiError> {
    decide(&state, SessionId(id), Decision::Reject).await
}

async fn snapshot(
    State(state): State<NegotiationState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.registry.get(&SessionId(id)).await.map_err(ApiError::from_domain)?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn start_session(
    state: &NegotiationState,
    id: SessionId,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    let Json(request) = body.map_err(ApiError::malformed_body)?;
    let (session, summary) =
        NegotiationSession::start(request, state.policy).map_err(ApiError::from_domain)?;

    info!(
        event_name = "negotiation.session.started",
        session_id = %id,
        max_discount = summary.max_discount,
        discounted_price = summary.discounted_price,
        "negotiation session started"
    );
    state.registry.replace(id.clone(), session).await;

    Ok(Json(StartResponse { summary, session_id: id }))
}

async fn propose(
    state: &NegotiationState,
    id: SessionId,
    body: Result<Json<ProposeRequest>, JsonRejection>,
) -> Result<Json<ProposalOutcome>, ApiError> {
    let Json(request) = body.map_err(ApiError::malformed_body)?;
    request.validate().map_err(ApiError::from_domain)?;
    let session = state.registry.get(&id).await.map_err(ApiError::from_domain)?;
    let mut session = session.lock().await;

    let outcome =
        session.propose(request, state.oracle.as_ref()).await.map_err(ApiError::from_domain)?;

    info!(
        event_name = "negotiation.proposal.completed",
        session_id = %id,
        outcome = outcome.kind(),
        final_price = outcome.final_price(),
        reason_count = outcome.all_reasons().len(),
        "proposal adjudicated"
    );
    Ok(Json(outcome))
}

#[derive(Clone, Copy)]
enum Decision {
    Accept,
    Reject,
}

async fn decide(
    state: &NegotiationState,
    id: SessionId,
    decision: Decision,
) -> Result<Json<OfferDecision>, ApiError> {
    let session = state.registry.get(&id).await.map_err(ApiError::from_domain)?;
    let session = session.lock().await;
    let (outcome, result) = match decision {
        Decision::Accept => ("accepted", session.accept()),
        Decision::Reject => ("rejected", session.reject()),
    };

    info!(
        event_name = "negotiation.offer.decided",
        session_id = %id,
        outcome,
        final_price = result.final_price,
        "offer decided"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use haggle_core::{NegotiationOracle, NegotiationPolicy, Sentiment};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, NegotiationState};
    use crate::sessions::SessionRegistry;

    /// Answers validity from a fixed list of accepted reasons and sentiment from a queue.
    struct ScriptedOracle {
        valid_reasons: Vec<&'static str>,
        sentiments: Mutex<VecDeque<Sentiment>>,
    }

    #[async_trait]
    impl NegotiationOracle for ScriptedOracle {
        async fn is_valid_reason(&self, reason: &str, _prior_reasons: &str) -> bool {
            self.valid_reasons.iter().any(|valid| *valid == reason)
        }

        async fn explain_rejection(&self, _reason: &str) -> Option<String> {
            Some("Not a product issue.".to_string())
        }

        async fn classify_sentiment(&self, _reason: &str) -> Sentiment {
            self.sentiments
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .unwrap_or_default()
        }
    }

    fn app(valid_reasons: Vec<&'static str>, sentiments: Vec<Sentiment>) -> Router {
        let oracle =
            ScriptedOracle { valid_reasons, sentiments: Mutex::new(sentiments.into_iter().collect()) };
        router(NegotiationState::new(
            SessionRegistry::default(),
            Arc::new(oracle),
            NegotiationPolicy::default(),
        ))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).expect("request should build"))
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, payload)
    }

    fn start_body(retail_price: f64, max_discount: f64) -> Value {
        json!({
            "productName": "Office Chair",
            "productPricing": 150,
            "maxDiscount": max_discount,
            "retailPrice": retail_price,
        })
    }

    fn assert_close(actual: &Value, expected: f64) {
        let actual = actual.as_f64().expect("numeric field");
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[tokio::test]
    async fn start_negotiation_reports_ceiling_and_floor() {
        let app = app(vec![], vec![]);

        let (status, body) =
            call(&app, Method::POST, "/start-negotiation", Some(start_body(200.0, 10.0))).await;

        assert_eq!(status, StatusCode::OK);
        assert_close(&body["maxDiscount"], 20.0);
        assert_close(&body["discountedPrice"], 180.0);
        assert_eq!(body["sessionId"], "default");
        assert_eq!(
            body["message"],
            "The current price of Office Chair is $200. Please provide a valid reason for requesting a discount."
        );
    }

    #[tokio::test]
    async fn start_negotiation_with_missing_field_is_bad_request() {
        let app = app(vec![], vec![]);

        let (status, body) = call(
            &app,
            Method::POST,
            "/start-negotiation",
            Some(json!({ "productName": "Office Chair", "retailPrice": 200 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Please provide product name, product pricing, max discount, and retail price."
        );
        assert!(body["correlationId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request_with_error_body() {
        let app = app(vec![], vec![]);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/start-negotiation")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request should build");

        let response = app.oneshot(request).await.expect("router should respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn proposing_before_start_is_conflict() {
        let app = app(vec!["defective"], vec![]);

        let (status, body) =
            call(&app, Method::POST, "/propose-discount", Some(json!({ "reason": "defective" }))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "No negotiation is in progress. Start a negotiation before making offers."
        );

        let (status, _) = call(&app, Method::POST, "/accept-offer", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_reason_is_bad_request() {
        let app = app(vec![], vec![]);
        call(&app, Method::POST, "/start-negotiation", Some(start_body(200.0, 10.0))).await;

        let (status, body) =
            call(&app, Method::POST, "/propose-discount", Some(json!({ "reason": "   " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Please provide a valid reason for requesting a discount.");
    }

    #[tokio::test]
    async fn missing_reason_before_start_is_bad_request_not_conflict() {
        let app = app(vec![], vec![]);

        let (status, body) = call(&app, Method::POST, "/propose-discount", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Please provide a valid reason for requesting a discount.");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/sessions/unknown/proposals",
            Some(json!({ "reason": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_reason_returns_rejection_with_explanation() {
        let app = app(vec![], vec![]);
        call(&app, Method::POST, "/start-negotiation", Some(start_body(200.0, 10.0))).await;

        let (status, body) =
            call(&app, Method::POST, "/propose-discount", Some(json!({ "reason": "I want it" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rejected"], true);
        assert_eq!(body["explanation"], "Not a product issue.");
        assert_close(&body["finalPrice"], 200.0);
        assert_eq!(body["allReasons"], json!(["I want it"]));
    }

    #[tokio::test]
    async fn polite_valid_reason_then_accept_uses_bonus_floor() {
        let app = app(vec!["defective"], vec![Sentiment::Polite]);
        call(&app, Method::POST, "/start-negotiation", Some(start_body(200.0, 10.0))).await;

        let (status, body) =
            call(&app, Method::POST, "/propose-discount", Some(json!({ "reason": "defective" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentiment"], "polite");
        assert_close(&body["discountApplied"], 21.0);
        assert_close(&body["finalPrice"], 179.0);
        assert_close(&body["originalPrice"], 150.0);

        let (status, body) = call(&app, Method::POST, "/accept-offer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Offer accepted. Thank you for your purchase!");
        assert_close(&body["finalPrice"], 179.0);

        let (_, body) = call(&app, Method::POST, "/reject-offer", None).await;
        assert_eq!(body["message"], "Offer rejected. No discount will be applied.");
        assert_close(&body["finalPrice"], 200.0);
    }

    #[tokio::test]
    async fn counter_offer_inside_range_is_accepted_and_outside_is_rejected() {
        let app = app(vec!["defective"], vec![]);
        call(&app, Method::POST, "/start-negotiation", Some(start_body(200.0, 10.0))).await;

        let (_, body) = call(
            &app,
            Method::POST,
            "/propose-discount",
            Some(json!({ "reason": "defective", "counterOffer": 150 })),
        )
        .await;
        assert_eq!(body["rejected"], true);
        assert_eq!(
            body["message"],
            "Counteroffer exceeds the maximum allowable discount. The price remains the same."
        );
        assert_close(&body["finalPrice"], 200.0);

        let (_, body) = call(
            &app,
            Method::POST,
            "/propose-discount",
            Some(json!({ "reason": "defective", "counterOffer": 185 })),
        )
        .await;
        assert_eq!(body["message"], "Your counteroffer of $185 is accepted.");
        assert_close(&body["finalPrice"], 185.0);
    }

    #[tokio::test]
    async fn keyed_sessions_are_isolated_from_each_other_and_the_default() {
        let app = app(vec!["defective"], vec![]);

        let (status, first) =
            call(&app, Method::POST, "/api/v1/sessions", Some(start_body(200.0, 10.0))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) =
            call(&app, Method::POST, "/api/v1/sessions", Some(start_body(100.0, 20.0))).await;
        let first_id = first["sessionId"].as_str().expect("session id").to_string();
        let second_id = second["sessionId"].as_str().expect("session id").to_string();
        assert_ne!(first_id, second_id);

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{first_id}/proposals"),
            Some(json!({ "reason": "defective" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, snapshot) =
            call(&app, Method::GET, &format!("/api/v1/sessions/{first_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["validatedReasons"], json!(["defective"]));

        let (_, snapshot) =
            call(&app, Method::GET, &format!("/api/v1/sessions/{second_id}"), None).await;
        assert_eq!(snapshot["allReasons"], json!([]));

        let (_, decision) =
            call(&app, Method::POST, &format!("/api/v1/sessions/{second_id}/accept"), None).await;
        assert_close(&decision["finalPrice"], 80.0);

        let (status, _) = call(&app, Method::POST, "/accept-offer", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_keyed_session_is_conflict() {
        let app = app(vec![], vec![]);

        let (status, body) = call(&app, Method::POST, "/api/v1/sessions/nope/reject", None).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["detail"].as_str().is_some_and(|detail| detail.contains("`nope`")));
    }
}
