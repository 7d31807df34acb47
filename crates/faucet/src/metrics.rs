//! Prometheus metrics for the faucet

use prometheus::{
    histogram_opts, opts, Encoder, Histogram, IntCounter, IntCounterVec, Registry, TextEncoder,
};

/// Claim outcomes as reported in `faucet_claims_total{outcome=..}`
pub mod outcome {
    pub const COMMITTED: &str = "committed";
    pub const ALREADY_CLAIMED: &str = "already_claimed";
    pub const REJECTED: &str = "rejected";
    pub const FAILED: &str = "failed";
    pub const PASSED: &str = "passed";
}

#[derive(Debug)]
pub struct FaucetMetrics {
    registry: Registry,
    pub admissions_rejected: IntCounter,
    pub claims_total: IntCounterVec,
    pub pre_checks_total: IntCounterVec,
    pub dispatch_duration: Histogram,
}

impl FaucetMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let admissions_rejected = IntCounter::with_opts(opts!(
            "faucet_admissions_rejected_total",
            "Requests shed by the admission controller"
        ))?;

        let claims_total = IntCounterVec::new(
            opts!("faucet_claims_total", "Claim requests by outcome"),
            &["kind", "outcome"],
        )?;

        let pre_checks_total = IntCounterVec::new(
            opts!("faucet_pre_checks_total", "Pre-check requests by outcome"),
            &["outcome"],
        )?;

        let dispatch_duration = Histogram::with_opts(histogram_opts!(
            "faucet_dispatch_duration_seconds",
            "Time spent waiting on the chain client"
        ))?;

        registry.register(Box::new(admissions_rejected.clone()))?;
        registry.register(Box::new(claims_total.clone()))?;
        registry.register(Box::new(pre_checks_total.clone()))?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        Ok(Self {
            registry,
            admissions_rejected,
            claims_total,
            pre_checks_total,
            dispatch_duration,
        })
    }

    pub fn record_claim(&self, kind: &str, outcome: &str) {
        self.claims_total.with_label_values(&[kind, outcome]).inc();
    }

    pub fn record_pre_check(&self, outcome: &str) {
        self.pre_checks_total.with_label_values(&[outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn gather(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_contains_recorded_outcomes() {
        let metrics = FaucetMetrics::new().unwrap();
        metrics.record_claim("direct", outcome::COMMITTED);
        metrics.record_pre_check(outcome::PASSED);
        metrics.admissions_rejected.inc();

        let text = metrics.gather().unwrap();
        assert!(text.contains("faucet_claims_total{kind=\"direct\",outcome=\"committed\"} 1"));
        assert!(text.contains("faucet_pre_checks_total{outcome=\"passed\"} 1"));
        assert!(text.contains("faucet_admissions_rejected_total 1"));
    }
}
