//! HTTP API for faucet service

use crate::admission::{admission_layer, AdmissionController, AdmissionState};
use crate::error::{codes, FaucetError};
use crate::service::{FaucetService, PRE_CHECK_PASS};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Direct claim request
#[derive(Debug, Deserialize)]
pub struct DirectClaimRequest {
    pub net: String,
    pub address: String,
}

/// Tweet claim request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetClaimRequest {
    pub net: String,
    pub address: String,
    pub tweet_url: String,
}

/// Pre-check request
#[derive(Debug, Deserialize)]
pub struct PreCheckRequest {
    pub net: String,
    pub address: String,
}

/// Success response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: codes::SUCCESS,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

fn reply<T: Serialize>(result: Result<T, FaucetError>) -> Response {
    match result {
        Ok(data) => Json(ApiResponse::success(data)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_failure(rejection: JsonRejection) -> Response {
    info!("Rejected malformed body: {}", rejection.body_text());
    FaucetError::Parse(rejection.body_text()).into_response()
}

/// Direct claim handler
pub async fn direct_claim_handler(
    State(service): State<FaucetService>,
    payload: Result<Json<DirectClaimRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return parse_failure(rejection),
    };
    info!("Direct claim request: net={}, address={}", request.net, request.address);

    let result = service
        .direct_claim(&request.net, &request.address)
        .await
        .map(|receipt| receipt.tx_hash);
    if let Err(e) = &result {
        error!("Direct claim error: {:?}", e);
    }
    reply(result)
}

/// Tweet claim handler
pub async fn tweet_claim_handler(
    State(service): State<FaucetService>,
    payload: Result<Json<TweetClaimRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return parse_failure(rejection),
    };
    info!(
        "Tweet claim request: net={}, address={}, tweet={}",
        request.net, request.address, request.tweet_url
    );

    let result = service
        .tweet_claim(&request.net, &request.address, &request.tweet_url)
        .await
        .map(|receipt| receipt.tx_hash);
    if let Err(e) = &result {
        error!("Tweet claim error: {:?}", e);
    }
    reply(result)
}

/// Pre-check handler
pub async fn pre_check_handler(
    State(service): State<FaucetService>,
    payload: Result<Json<PreCheckRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return parse_failure(rejection),
    };

    let result = service
        .pre_check(&request.net, &request.address)
        .await
        .map(|()| PRE_CHECK_PASS);
    reply(result)
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Prometheus metrics handler
pub async fn metrics_handler(State(service): State<FaucetService>) -> Result<String, StatusCode> {
    service.metrics().gather().map_err(|err| {
        error!("Failed to gather metrics: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Build the faucet router. Admission control wraps every route.
pub fn router(service: FaucetService, admission: Arc<AdmissionController>, cors_enabled: bool) -> Router {
    let admission_state = AdmissionState {
        controller: admission,
        metrics: service.metrics().clone(),
    };

    let mut app = Router::new()
        .route("/faucet/directClaim", post(direct_claim_handler))
        .route("/faucet/tweetClaim", post(tweet_claim_handler))
        .route("/faucet/preCheck", post(pre_check_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(service)
        .layer(middleware::from_fn_with_state(admission_state, admission_layer));

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}
