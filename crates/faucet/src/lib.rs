//! Testnet token faucet
//!
//! Funds one claim per address per network per eligibility window:
//! - Admission control (fixed-window ceiling, 503 on overload)
//! - Durable eligibility store with exclusive reservations
//! - Claim orchestration against a pluggable chain client
//! - Prometheus metrics and structured logging

pub mod admission;
pub mod api;
pub mod chain;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod validation;

pub use admission::AdmissionController;
pub use chain::{ChainClient, ChainError, DispatchRequest, RpcChainClient};
pub use config::FaucetConfig;
pub use database::{ClaimKey, ClaimRecord, ClaimState, EligibilityStore, ReserveOutcome};
pub use error::{FaucetError, FaucetResult};
pub use metrics::FaucetMetrics;
pub use service::{ClaimKind, ClaimPolicy, ClaimReceipt, FaucetService};
