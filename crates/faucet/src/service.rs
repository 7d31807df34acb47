//! Claim orchestration
//!
//! validate -> reserve -> dispatch -> resolve. The eligibility store's
//! reservation is the only synchronization point; the chain call runs while
//! holding nothing but the reservation record.

use crate::chain::{ChainClient, ChainError, DispatchRequest};
use crate::config::FaucetConfig;
use crate::database::{ClaimKey, ClaimRecord, EligibilityStore, ReserveOutcome};
use crate::error::{FaucetError, FaucetResult};
use crate::metrics::{outcome, FaucetMetrics};
use crate::validation::{validate_address, validate_network, validate_tweet_url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Message returned by a passing pre-check
pub const PRE_CHECK_PASS: &str = "PreCheck Pass";

/// Which endpoint a claim came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    Direct,
    Tweet,
}

impl ClaimKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimKind::Direct => "direct",
            ClaimKind::Tweet => "tweet",
        }
    }
}

/// Fixed policy values applied to every claim
#[derive(Debug, Clone)]
pub struct ClaimPolicy {
    pub test_net_name: String,
    pub direct_amount: u128,
    pub tweet_amount: u128,
}

impl ClaimPolicy {
    pub fn from_config(config: &FaucetConfig) -> FaucetResult<Self> {
        Ok(Self {
            test_net_name: config.test_net_name.clone(),
            direct_amount: config.amount_wei()?,
            tweet_amount: config.tweet_amount_wei()?,
        })
    }

    fn amount_for(&self, kind: ClaimKind) -> u128 {
        match kind {
            ClaimKind::Direct => self.direct_amount,
            ClaimKind::Tweet => self.tweet_amount,
        }
    }
}

/// Successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub tx_hash: String,
    pub address: String,
    pub amount: String,
}

/// A claim that passed validation
#[derive(Debug, Clone)]
struct ClaimTicket {
    kind: ClaimKind,
    key: ClaimKey,
    network: String,
    address: String,
    tweet_url: Option<String>,
}

/// Faucet claim service
#[derive(Clone)]
pub struct FaucetService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    policy: ClaimPolicy,
    store: EligibilityStore,
    chain: Arc<dyn ChainClient>,
    metrics: Arc<FaucetMetrics>,
}

impl FaucetService {
    pub fn new(
        policy: ClaimPolicy,
        store: EligibilityStore,
        chain: Arc<dyn ChainClient>,
        metrics: Arc<FaucetMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                policy,
                store,
                chain,
                metrics,
            }),
        }
    }

    pub fn store(&self) -> &EligibilityStore {
        &self.inner.store
    }

    pub fn metrics(&self) -> &Arc<FaucetMetrics> {
        &self.inner.metrics
    }

    /// Fund `address` with the direct-claim amount.
    pub async fn direct_claim(&self, net: &str, address: &str) -> FaucetResult<ClaimReceipt> {
        let result = match self.validate(ClaimKind::Direct, net, address, None) {
            Ok(ticket) => self.claim(ticket).await,
            Err(e) => Err(e),
        };
        self.record(ClaimKind::Direct, &result);
        result
    }

    /// Fund `address` with the tweet-claim amount, attributing it to `tweet_url`.
    pub async fn tweet_claim(&self, net: &str, address: &str, tweet_url: &str) -> FaucetResult<ClaimReceipt> {
        let result = match self.validate(ClaimKind::Tweet, net, address, Some(tweet_url)) {
            Ok(ticket) => self.claim(ticket).await,
            Err(e) => Err(e),
        };
        self.record(ClaimKind::Tweet, &result);
        result
    }

    /// Validation, eligibility and chain pre-check only. Never writes a record.
    pub async fn pre_check(&self, net: &str, address: &str) -> FaucetResult<()> {
        let result = self.run_pre_check(net, address).await;
        let label = match &result {
            Ok(()) => outcome::PASSED,
            Err(e) => outcome_label(e),
        };
        self.inner.metrics.record_pre_check(label);
        result
    }

    async fn run_pre_check(&self, net: &str, address: &str) -> FaucetResult<()> {
        let ticket = self.validate(ClaimKind::Direct, net, address, None)?;

        if !self.inner.store.is_eligible(&ticket.key).await? {
            debug!("Pre-check: {} is not eligible", ticket.key);
            return Err(FaucetError::AlreadyClaimed(ticket.address));
        }

        self.inner
            .chain
            .pre_check(&ticket.network, &ticket.address)
            .await?;
        Ok(())
    }

    fn validate(
        &self,
        kind: ClaimKind,
        net: &str,
        address: &str,
        tweet_url: Option<&str>,
    ) -> FaucetResult<ClaimTicket> {
        validate_address(address)?;
        validate_network(net, &self.inner.policy.test_net_name)?;
        if let Some(url) = tweet_url {
            validate_tweet_url(url)?;
        }

        Ok(ClaimTicket {
            kind,
            key: ClaimKey::native(address, net),
            network: net.to_string(),
            address: address.to_string(),
            tweet_url: tweet_url.map(str::to_string),
        })
    }

    async fn claim(&self, ticket: ClaimTicket) -> FaucetResult<ClaimReceipt> {
        let amount = self.inner.policy.amount_for(ticket.kind);
        let record = ClaimRecord::reservation(
            ticket.key.clone(),
            &ticket.network,
            amount,
            ticket.tweet_url.clone(),
        );

        let attempt = match self.inner.store.try_reserve(&ticket.key, record).await? {
            ReserveOutcome::Reserved(attempt) => attempt,
            ReserveOutcome::AlreadyReserved(existing) => {
                warn!(
                    "Claim refused for {}: {:?} record since {}",
                    ticket.key, existing.state, existing.reserved_at
                );
                return Err(FaucetError::AlreadyClaimed(ticket.address));
            }
        };

        // Dispatch in a detached task so a dropped request still resolves its reservation.
        let service = self.clone();
        tokio::spawn(async move { service.dispatch_and_resolve(ticket, attempt, amount).await })
            .await
            .map_err(|e| FaucetError::InternalError(format!("claim task failed: {}", e)))?
    }

    async fn dispatch_and_resolve(
        &self,
        ticket: ClaimTicket,
        attempt: Uuid,
        amount: u128,
    ) -> FaucetResult<ClaimReceipt> {
        let request = DispatchRequest {
            network: ticket.network.clone(),
            address: ticket.address.clone(),
            amount,
            attribution: ticket.tweet_url.clone(),
        };

        let timer = self.inner.metrics.dispatch_duration.start_timer();
        let dispatched = self.inner.chain.send_transaction(&request).await;
        timer.observe_duration();

        match dispatched {
            Ok(tx_hash) => {
                match self.inner.store.commit(&ticket.key, attempt, &tx_hash).await {
                    Ok(()) => {}
                    Err(e @ FaucetError::ReservationNotHeld(_)) => {
                        // The reservation expired mid-dispatch and now belongs to
                        // another attempt; that record stands.
                        error!(
                            "Reservation for {} lost before commit, tx {} sent anyway",
                            ticket.key, tx_hash
                        );
                        return Err(e);
                    }
                    Err(e) => {
                        error!("Commit failed for {} after tx {}: {}", ticket.key, tx_hash, e);
                        self.release(&ticket.key, attempt).await;
                        return Err(e);
                    }
                }
                info!(
                    "Dispensed {} wei to {} via {} claim, tx: {}",
                    amount,
                    ticket.address,
                    ticket.kind.as_str(),
                    tx_hash
                );
                Ok(ClaimReceipt {
                    tx_hash,
                    address: ticket.address,
                    amount: amount.to_string(),
                })
            }
            Err(err @ ChainError::AddressLocked { .. }) => {
                // The address is consumed elsewhere; keep the record.
                warn!("Chain reported {} as locked: {}", ticket.key, err);
                Err(err.into())
            }
            Err(err) => {
                warn!("Dispatch failed for {} (code {}): {}", ticket.key, err.code(), err);
                self.release(&ticket.key, attempt).await;
                Err(err.into())
            }
        }
    }

    async fn release(&self, key: &ClaimKey, attempt: Uuid) {
        match self.inner.store.release(key, attempt).await {
            Ok(true) => {}
            Ok(false) => warn!("Reservation for {} no longer held by attempt {}", key, attempt),
            Err(e) => error!("Rollback failed for {}, record will expire on its own: {}", key, e),
        }
    }

    fn record(&self, kind: ClaimKind, result: &FaucetResult<ClaimReceipt>) {
        let label = match result {
            Ok(_) => outcome::COMMITTED,
            Err(e) => outcome_label(e),
        };
        self.inner.metrics.record_claim(kind.as_str(), label);
    }
}

fn outcome_label(err: &FaucetError) -> &'static str {
    match err {
        FaucetError::AlreadyClaimed(_) => outcome::ALREADY_CLAIMED,
        FaucetError::Chain(chain) if chain.is_conflict() => outcome::ALREADY_CLAIMED,
        e if e.is_validation() => outcome::REJECTED,
        _ => outcome::FAILED,
    }
}
