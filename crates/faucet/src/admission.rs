//! Global admission control
//!
//! A fixed-window counter shared by every request. The window index and the
//! number of admitted requests are packed into one `AtomicU64` so that the
//! check is a single compare-and-swap loop with no locks and no waiting.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::FaucetError;
use crate::metrics::FaucetMetrics;

/// Default ceiling of admitted requests per second
pub const DEFAULT_ADMISSION_LIMIT: u32 = 200;

/// Sheds requests once more than `limit` arrive within one window.
#[derive(Debug)]
pub struct AdmissionController {
    limit: u32,
    window_nanos: u128,
    origin: Instant,
    /// High 32 bits: window index. Low 32 bits: admitted count.
    state: AtomicU64,
}

impl AdmissionController {
    /// `limit` requests per `window`. A zero window is treated as one nanosecond.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window_nanos: window.as_nanos().max(1),
            origin: Instant::now(),
            state: AtomicU64::new(pack(0, 0)),
        }
    }

    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Admit one request, or return `false` if the current window is full.
    pub fn admit(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let now_window = self.current_window();
            let (window, count) = unpack(current);

            let next = if window == now_window || is_ahead(window, now_window) {
                // A caller that read the clock late must not reopen an older window.
                if count >= self.limit {
                    return false;
                }
                pack(window, count + 1)
            } else {
                pack(now_window, 1)
            };

            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Requests admitted so far in the current window.
    pub fn admitted_in_window(&self) -> u32 {
        let (window, count) = unpack(self.state.load(Ordering::Acquire));
        if window == self.current_window() {
            count
        } else {
            0
        }
    }

    fn current_window(&self) -> u32 {
        // Wrapping is fine: windows are only compared for equality and recency.
        (self.origin.elapsed().as_nanos() / self.window_nanos) as u32
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::per_second(DEFAULT_ADMISSION_LIMIT)
    }
}

fn pack(window: u32, count: u32) -> u64 {
    ((window as u64) << 32) | count as u64
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

fn is_ahead(stored: u32, observed: u32) -> bool {
    let diff = stored.wrapping_sub(observed);
    diff != 0 && diff < u32::MAX / 2
}

/// State for the admission middleware
#[derive(Clone)]
pub struct AdmissionState {
    pub controller: Arc<AdmissionController>,
    pub metrics: Arc<FaucetMetrics>,
}

/// Middleware that answers 503 with an empty body when the ceiling is hit.
///
/// Runs before any extractor, so overloaded requests never have their body parsed.
pub async fn admission_layer(
    State(state): State<AdmissionState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.controller.admit() {
        state.metrics.admissions_rejected.inc();
        warn!(path = %request.uri().path(), "Admission ceiling reached, shedding request");
        return FaucetError::Overloaded.into_response();
    }

    debug!(path = %request.uri().path(), "Request admitted");
    next.run(request).await
}
