//! Error types for the faucet service

use crate::chain::ChainError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Stable response codes returned in the `code` field of every reply.
pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const PARSE_ERROR: i32 = 10001;
    pub const INVALID_ADDRESS: i32 = 10002;
    pub const UNSUPPORTED_NETWORK: i32 = 10003;
    pub const INVALID_TWEET_URL: i32 = 10004;
    pub const ALREADY_CLAIMED: i32 = 10005;
    pub const INSUFFICIENT_FUNDS: i32 = 10006;
    pub const STORAGE: i32 = 10007;
    pub const RESERVATION_NOT_HELD: i32 = 10008;
    pub const CHAIN_UNAVAILABLE: i32 = 10009;
    pub const CONFIG: i32 = 10010;
    pub const OVERLOADED: i32 = 10011;
    pub const INTERNAL: i32 = 10099;
}

/// Faucet service errors
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Invalid request body: {0}")]
    Parse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Invalid tweet url: {0}")]
    InvalidTweetUrl(String),

    #[error("Address {0} has already claimed on this network")]
    AlreadyClaimed(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sled::Error),

    #[error("No reservation held for {0}")]
    ReservationNotHeld(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service overloaded")]
    Overloaded,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl FaucetError {
    /// Numeric code reported to clients.
    pub fn code(&self) -> i32 {
        match self {
            FaucetError::Parse(_) => codes::PARSE_ERROR,
            FaucetError::InvalidAddress(_) => codes::INVALID_ADDRESS,
            FaucetError::UnsupportedNetwork(_) => codes::UNSUPPORTED_NETWORK,
            FaucetError::InvalidTweetUrl(_) => codes::INVALID_TWEET_URL,
            FaucetError::AlreadyClaimed(_) => codes::ALREADY_CLAIMED,
            FaucetError::Chain(err) => err.code(),
            FaucetError::DatabaseError(_) => codes::STORAGE,
            FaucetError::ReservationNotHeld(_) => codes::RESERVATION_NOT_HELD,
            FaucetError::Config(_) => codes::CONFIG,
            FaucetError::Overloaded => codes::OVERLOADED,
            FaucetError::InternalError(_) => codes::INTERNAL,
        }
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            FaucetError::Chain(err) => !err.is_conflict(),
            FaucetError::DatabaseError(_)
            | FaucetError::ReservationNotHeld(_)
            | FaucetError::Overloaded
            | FaucetError::InternalError(_) => true,
            _ => false,
        }
    }

    /// Client-side validation failures, raised before any state is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FaucetError::Parse(_)
                | FaucetError::InvalidAddress(_)
                | FaucetError::UnsupportedNetwork(_)
                | FaucetError::InvalidTweetUrl(_)
        )
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        if let FaucetError::Overloaded = self {
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }

        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
            "data": null,
        }));

        (StatusCode::OK, body).into_response()
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;
