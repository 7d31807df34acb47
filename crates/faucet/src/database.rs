//! Eligibility store: durable claim records with exclusive reservations
//!
//! Each claim key maps to at most one [`ClaimRecord`]. Reservation and commit
//! are compare-and-swap operations on that single key, so unrelated keys never
//! contend and the record itself is the concurrency token. Expiry is lazy:
//! a record past its window is treated as absent and replaced on the next
//! reservation.

use crate::clock::{Clock, SystemClock};
use crate::error::{FaucetError, FaucetResult};
use serde::{Deserialize, Serialize};
use sled::{Db, IVec, Tree};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Asset identifier of the chain's native token
pub const NATIVE_ASSET: &str = "native";

/// Identity under which eligibility is tracked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimKey {
    address: String,
    asset: String,
    network: String,
}

impl ClaimKey {
    /// Address, asset and network are lower-cased so every spelling maps to one key.
    pub fn new(address: &str, asset: &str, network: &str) -> Self {
        Self {
            address: address.to_lowercase(),
            asset: asset.to_lowercase(),
            network: network.to_lowercase(),
        }
    }

    pub fn native(address: &str, network: &str) -> Self {
        Self::new(address, NATIVE_ASSET, network)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    fn storage_key(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.address, self.asset, self.network)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    Reserved,
    Committed,
}

/// Claim record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub key: ClaimKey,
    /// Identifies the request that made the reservation
    pub attempt: Uuid,
    /// Unix millis when the reservation was taken
    pub reserved_at: i64,
    /// Unix millis when the claim was committed
    pub committed_at: Option<i64>,
    pub network: String,
    /// Amount in wei
    pub amount: String,
    /// Token contract, empty for the native asset
    pub contract_address: String,
    pub tx_hash: Option<String>,
    pub tweet_url: Option<String>,
    pub state: ClaimState,
}

impl ClaimRecord {
    /// A fresh reservation for `key`. `reserved_at` is stamped by the store.
    pub fn reservation(key: ClaimKey, network: &str, amount: u128, tweet_url: Option<String>) -> Self {
        let contract_address = if key.asset() == NATIVE_ASSET {
            String::new()
        } else {
            key.asset().to_string()
        };

        Self {
            key,
            attempt: Uuid::new_v4(),
            reserved_at: 0,
            committed_at: None,
            network: network.to_string(),
            amount: amount.to_string(),
            contract_address,
            tx_hash: None,
            tweet_url,
            state: ClaimState::Reserved,
        }
    }
}

/// Result of a reservation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The key is now held by this attempt.
    Reserved(Uuid),
    /// A live record already holds the key.
    AlreadyReserved(ClaimRecord),
}

/// Eligibility store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStatistics {
    pub committed: usize,
    pub reserved: usize,
    pub expired: usize,
}

/// Durable eligibility store backed by sled
#[derive(Clone)]
pub struct EligibilityStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    db: Db,
    /// Tree for claim records, keyed by `address:asset:network`
    claims: Tree,
    clock: Arc<dyn Clock>,
    eligibility_window_ms: i64,
    reservation_timeout_ms: i64,
}

impl EligibilityStore {
    /// Create or open the store at `path` using the system clock.
    pub fn open(path: &str, eligibility_window: Duration, reservation_timeout: Duration) -> FaucetResult<Self> {
        Self::open_with_clock(path, eligibility_window, reservation_timeout, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        path: &str,
        eligibility_window: Duration,
        reservation_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> FaucetResult<Self> {
        info!("Opening eligibility store at: {}", path);

        let db = sled::Config::default()
            .path(path)
            .cache_capacity(64 * 1024 * 1024) // 64MB cache
            .open()?;
        let claims = db.open_tree("claims")?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                db,
                claims,
                clock,
                eligibility_window_ms: duration_millis(eligibility_window),
                reservation_timeout_ms: duration_millis(reservation_timeout),
            }),
        })
    }

    /// Insert `record` as a Reserved claim iff no live record exists for `key`.
    pub async fn try_reserve(&self, key: &ClaimKey, record: ClaimRecord) -> FaucetResult<ReserveOutcome> {
        let key = key.clone();
        self.blocking(move |inner| inner.try_reserve(&key, record)).await
    }

    /// Move the reservation held by `attempt` to Committed.
    pub async fn commit(&self, key: &ClaimKey, attempt: Uuid, tx_hash: &str) -> FaucetResult<()> {
        let key = key.clone();
        let tx_hash = tx_hash.to_string();
        self.blocking(move |inner| inner.commit(&key, attempt, tx_hash)).await
    }

    /// Delete the record for `key`, whatever its state.
    pub async fn rollback(&self, key: &ClaimKey) -> FaucetResult<()> {
        let key = key.clone();
        self.blocking(move |inner| inner.rollback(&key)).await
    }

    /// Delete the record for `key` only while it is still the Reserved record of `attempt`.
    ///
    /// Returns whether a record was removed. A reservation that expired and was
    /// taken over by another attempt, or one that was committed, is left alone.
    pub async fn release(&self, key: &ClaimKey, attempt: Uuid) -> FaucetResult<bool> {
        let key = key.clone();
        self.blocking(move |inner| inner.release(&key, attempt)).await
    }

    /// True iff no live record exists for `key`.
    pub async fn is_eligible(&self, key: &ClaimKey) -> FaucetResult<bool> {
        let key = key.clone();
        self.blocking(move |inner| Ok(inner.live_record(&key)?.is_none())).await
    }

    /// The live record for `key`, if any.
    pub async fn get(&self, key: &ClaimKey) -> FaucetResult<Option<ClaimRecord>> {
        let key = key.clone();
        self.blocking(move |inner| inner.live_record(&key)).await
    }

    /// Delete every expired record. Returns how many were removed.
    pub async fn purge_expired(&self) -> FaucetResult<usize> {
        self.blocking(|inner| inner.purge_expired()).await
    }

    pub async fn statistics(&self) -> FaucetResult<ClaimStatistics> {
        self.blocking(|inner| inner.statistics()).await
    }

    async fn blocking<T, F>(&self, op: F) -> FaucetResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&StoreInner) -> FaucetResult<T> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || op(inner.as_ref()))
            .await
            .map_err(|e| FaucetError::InternalError(format!("store task failed: {}", e)))?
    }
}

impl StoreInner {
    fn try_reserve(&self, key: &ClaimKey, mut record: ClaimRecord) -> FaucetResult<ReserveOutcome> {
        let storage_key = key.storage_key();
        record.key = key.clone();
        record.state = ClaimState::Reserved;
        record.committed_at = None;
        record.tx_hash = None;

        loop {
            let now = self.clock.now_millis();
            let current = self.claims.get(&storage_key)?;

            if let Some(bytes) = &current {
                let existing = decode(bytes)?;
                if self.is_live(&existing, now) {
                    debug!("Reservation refused for {}: {:?} record is live", key, existing.state);
                    return Ok(ReserveOutcome::AlreadyReserved(existing));
                }
                debug!("Replacing expired {:?} record for {}", existing.state, key);
            }

            record.reserved_at = now;
            let encoded = encode(&record)?;

            match self
                .claims
                .compare_and_swap(&storage_key, current.as_ref(), Some(encoded.as_slice()))?
            {
                Ok(()) => {
                    self.settle_reservation(&storage_key, &encoded, self.db.flush())?;
                    debug!("Reserved {} for attempt {}", key, record.attempt);
                    return Ok(ReserveOutcome::Reserved(record.attempt));
                }
                // Another writer touched the key between read and swap; re-evaluate.
                Err(_) => continue,
            }
        }
    }

    fn commit(&self, key: &ClaimKey, attempt: Uuid, tx_hash: String) -> FaucetResult<()> {
        let storage_key = key.storage_key();
        let current = self
            .claims
            .get(&storage_key)?
            .ok_or_else(|| FaucetError::ReservationNotHeld(key.to_string()))?;

        let mut record = decode(&current)?;
        if record.state != ClaimState::Reserved || record.attempt != attempt {
            return Err(FaucetError::ReservationNotHeld(key.to_string()));
        }

        record.state = ClaimState::Committed;
        record.committed_at = Some(self.clock.now_millis());
        record.tx_hash = Some(tx_hash);

        match self
            .claims
            .compare_and_swap(&storage_key, Some(&current), Some(encode(&record)?))?
        {
            Ok(()) => {
                self.db.flush()?;
                info!("Committed claim {} (tx {:?})", key, record.tx_hash);
                Ok(())
            }
            Err(_) => Err(FaucetError::ReservationNotHeld(key.to_string())),
        }
    }

    /// Undo a just-inserted reservation whose flush failed, so a storage fault
    /// never leaves the key blocked until the reservation times out.
    fn settle_reservation(
        &self,
        storage_key: &[u8],
        encoded: &[u8],
        flushed: sled::Result<usize>,
    ) -> FaucetResult<()> {
        let err = match flushed {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        error!("Flush failed after reserving {}: {}", String::from_utf8_lossy(storage_key), err);
        match self
            .claims
            .compare_and_swap(storage_key, Some(encoded), None as Option<IVec>)
        {
            Ok(Ok(())) => debug!("Withdrew unflushed reservation"),
            Ok(Err(_)) => warn!("Unflushed reservation was replaced before it could be withdrawn"),
            Err(e) => warn!("Could not withdraw unflushed reservation: {}", e),
        }
        Err(err.into())
    }

    fn release(&self, key: &ClaimKey, attempt: Uuid) -> FaucetResult<bool> {
        let storage_key = key.storage_key();
        let current = match self.claims.get(&storage_key)? {
            Some(bytes) => bytes,
            None => return Ok(false),
        };

        let record = decode(&current)?;
        if record.state != ClaimState::Reserved || record.attempt != attempt {
            debug!("Release skipped for {}: record belongs to attempt {}", key, record.attempt);
            return Ok(false);
        }

        match self
            .claims
            .compare_and_swap(&storage_key, Some(&current), None as Option<IVec>)?
        {
            Ok(()) => {
                self.db.flush()?;
                debug!("Released reservation {} of attempt {}", key, attempt);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn rollback(&self, key: &ClaimKey) -> FaucetResult<()> {
        if self.claims.remove(key.storage_key())?.is_some() {
            self.db.flush()?;
            debug!("Rolled back claim {}", key);
        }
        Ok(())
    }

    fn live_record(&self, key: &ClaimKey) -> FaucetResult<Option<ClaimRecord>> {
        let now = self.clock.now_millis();
        match self.claims.get(key.storage_key())? {
            Some(bytes) => {
                let record = decode(&bytes)?;
                Ok(self.is_live(&record, now).then_some(record))
            }
            None => Ok(None),
        }
    }

    fn is_live(&self, record: &ClaimRecord, now: i64) -> bool {
        match record.state {
            ClaimState::Reserved => now - record.reserved_at <= self.reservation_timeout_ms,
            ClaimState::Committed => {
                let committed_at = record.committed_at.unwrap_or(record.reserved_at);
                now - committed_at <= self.eligibility_window_ms
            }
        }
    }

    fn purge_expired(&self) -> FaucetResult<usize> {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for item in self.claims.iter() {
            let (key, value) = item?;
            let record = match decode(&value) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping undecodable claim record: {}", e);
                    continue;
                }
            };
            if self.is_live(&record, now) {
                continue;
            }
            // Only delete the exact bytes we judged expired; a fresh reservation wins.
            if self
                .claims
                .compare_and_swap(&key, Some(&value), None as Option<IVec>)?
                .is_ok()
            {
                removed += 1;
            }
        }

        if removed > 0 {
            self.db.flush()?;
        }
        info!("Purged {} expired claim records", removed);
        Ok(removed)
    }

    fn statistics(&self) -> FaucetResult<ClaimStatistics> {
        let now = self.clock.now_millis();
        let mut stats = ClaimStatistics::default();

        for item in self.claims.iter() {
            let (_, value) = item?;
            let record = decode(&value)?;
            match (self.is_live(&record, now), record.state) {
                (false, _) => stats.expired += 1,
                (true, ClaimState::Reserved) => stats.reserved += 1,
                (true, ClaimState::Committed) => stats.committed += 1,
            }
        }

        Ok(stats)
    }
}

fn encode(record: &ClaimRecord) -> FaucetResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| FaucetError::InternalError(e.to_string()))
}

fn decode(bytes: &[u8]) -> FaucetResult<ClaimRecord> {
    bincode::deserialize(bytes).map_err(|e| FaucetError::InternalError(e.to_string()))
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tempfile::TempDir;

    const ADDRESS: &str = "0xABCDEF0123456789abcdef0123456789ABCDEF01";
    const DAY: Duration = Duration::from_secs(86400);
    const TIMEOUT: Duration = Duration::from_secs(300);

    fn open_store(dir: &TempDir, clock: Arc<ManualClock>) -> EligibilityStore {
        EligibilityStore::open_with_clock(
            dir.path().to_str().unwrap(),
            DAY,
            TIMEOUT,
            clock,
        )
        .unwrap()
    }

    fn reservation(key: &ClaimKey) -> ClaimRecord {
        ClaimRecord::reservation(key.clone(), "testnet", 1_000, None)
    }

    #[test]
    fn test_key_normalizes_case() {
        let upper = ClaimKey::native(ADDRESS, "TestNet");
        let lower = ClaimKey::native(&ADDRESS.to_lowercase(), "testnet");
        assert_eq!(upper, lower);
        assert_eq!(upper.storage_key(), lower.storage_key());
        assert_eq!(
            upper.to_string(),
            "0xabcdef0123456789abcdef0123456789abcdef01:native:testnet"
        );
    }

    #[tokio::test]
    async fn test_reservation_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = open_store(&dir, clock);
        let key = ClaimKey::native(ADDRESS, "testnet");

        let first = store.try_reserve(&key, reservation(&key)).await.unwrap();
        assert!(matches!(first, ReserveOutcome::Reserved(_)));

        let other_case = ClaimKey::native(&ADDRESS.to_lowercase(), "TESTNET");
        let second = store.try_reserve(&other_case, reservation(&other_case)).await.unwrap();
        match second {
            ReserveOutcome::AlreadyReserved(existing) => {
                assert_eq!(existing.state, ClaimState::Reserved);
                assert_eq!(existing.reserved_at, 1_000_000);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(!store.is_eligible(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_requires_owning_attempt() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, Arc::new(ManualClock::new(0)));
        let key = ClaimKey::native(ADDRESS, "testnet");

        let attempt = match store.try_reserve(&key, reservation(&key)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };

        let stranger = store.commit(&key, Uuid::new_v4(), "0xdead").await;
        assert!(matches!(stranger, Err(FaucetError::ReservationNotHeld(_))));

        store.commit(&key, attempt, "0xbeef").await.unwrap();
        let record = store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.state, ClaimState::Committed);
        assert_eq!(record.tx_hash.as_deref(), Some("0xbeef"));

        // A committed record cannot be committed again.
        let again = store.commit(&key, attempt, "0xbeef").await;
        assert!(matches!(again, Err(FaucetError::ReservationNotHeld(_))));

        let missing = ClaimKey::native("0x0000000000000000000000000000000000000001", "testnet");
        assert!(matches!(
            store.commit(&missing, attempt, "0x").await,
            Err(FaucetError::ReservationNotHeld(_))
        ));
    }

    #[tokio::test]
    async fn test_rollback_frees_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, Arc::new(ManualClock::new(0)));
        let key = ClaimKey::native(ADDRESS, "testnet");

        store.try_reserve(&key, reservation(&key)).await.unwrap();
        store.rollback(&key).await.unwrap();
        assert!(store.is_eligible(&key).await.unwrap());

        // Rolling back an absent key is fine.
        store.rollback(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_release_only_removes_own_reservation() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(&dir, clock.clone());
        let key = ClaimKey::native(ADDRESS, "testnet");

        let stale = match store.try_reserve(&key, reservation(&key)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };
        clock.set_millis(TIMEOUT.as_millis() as i64 + 1);
        let fresh = match store.try_reserve(&key, reservation(&key)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };

        assert!(!store.release(&key, stale).await.unwrap());
        assert_eq!(store.get(&key).await.unwrap().unwrap().attempt, fresh);

        store.commit(&key, fresh, "0x03").await.unwrap();
        assert!(!store.release(&key, fresh).await.unwrap(), "committed records are kept");
        assert!(!store.is_eligible(&key).await.unwrap());

        let other = ClaimKey::native("0x2222222222222222222222222222222222222222", "testnet");
        let attempt = match store.try_reserve(&other, reservation(&other)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };
        assert!(store.release(&other, attempt).await.unwrap());
        assert!(store.is_eligible(&other).await.unwrap());
    }

    #[test]
    fn test_failed_flush_withdraws_reservation() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, Arc::new(ManualClock::new(0)));
        let inner = store.inner.as_ref();
        let key = ClaimKey::native(ADDRESS, "testnet");
        let storage_key = key.storage_key();
        let encoded = encode(&reservation(&key)).unwrap();

        inner.claims.insert(&storage_key, encoded.as_slice()).unwrap();
        let flushed = Err(sled::Error::Unsupported("disk full".to_string()));
        let result = inner.settle_reservation(&storage_key, &encoded, flushed);

        assert!(matches!(result, Err(FaucetError::DatabaseError(_))));
        assert!(inner.claims.get(&storage_key).unwrap().is_none());
        assert!(inner.live_record(&key).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_committed_claim_expires_strictly_after_window() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(10_000));
        let store = open_store(&dir, clock.clone());
        let key = ClaimKey::native(ADDRESS, "testnet");

        let attempt = match store.try_reserve(&key, reservation(&key)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };
        clock.advance_millis(500);
        store.commit(&key, attempt, "0x01").await.unwrap();

        clock.advance_millis(DAY.as_millis() as i64);
        assert!(!store.is_eligible(&key).await.unwrap(), "window boundary still blocks");

        clock.advance_millis(1);
        assert!(store.is_eligible(&key).await.unwrap());

        let outcome = store.try_reserve(&key, reservation(&key)).await.unwrap();
        assert!(matches!(outcome, ReserveOutcome::Reserved(_)));
    }

    #[tokio::test]
    async fn test_orphaned_reservation_self_heals() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(&dir, clock.clone());
        let key = ClaimKey::native(ADDRESS, "testnet");

        store.try_reserve(&key, reservation(&key)).await.unwrap();
        clock.advance_millis(TIMEOUT.as_millis() as i64);
        assert!(!store.is_eligible(&key).await.unwrap());

        clock.advance_millis(1);
        assert!(store.is_eligible(&key).await.unwrap());
        assert!(matches!(
            store.try_reserve(&key, reservation(&key)).await.unwrap(),
            ReserveOutcome::Reserved(_)
        ));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(0));
        let key = ClaimKey::native(ADDRESS, "testnet");

        {
            let store = open_store(&dir, clock.clone());
            let attempt = match store.try_reserve(&key, reservation(&key)).await.unwrap() {
                ReserveOutcome::Reserved(attempt) => attempt,
                other => panic!("unexpected {:?}", other),
            };
            store.commit(&key, attempt, "0xfeed").await.unwrap();
        }

        let reopened = open_store(&dir, clock);
        assert!(!reopened.is_eligible(&key).await.unwrap());
        let record = reopened.get(&key).await.unwrap().unwrap();
        assert_eq!(record.tx_hash.as_deref(), Some("0xfeed"));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_single_winner() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, Arc::new(ManualClock::new(0)));
        let key = ClaimKey::native(ADDRESS, "testnet");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store.try_reserve(&key, reservation(&key)).await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if let ReserveOutcome::Reserved(_) = handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_purge_and_statistics() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(&dir, clock.clone());

        let committed = ClaimKey::native(ADDRESS, "testnet");
        let attempt = match store.try_reserve(&committed, reservation(&committed)).await.unwrap() {
            ReserveOutcome::Reserved(attempt) => attempt,
            other => panic!("unexpected {:?}", other),
        };
        store.commit(&committed, attempt, "0x02").await.unwrap();

        let pending = ClaimKey::native("0x1111111111111111111111111111111111111111", "testnet");
        store.try_reserve(&pending, reservation(&pending)).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats, ClaimStatistics { committed: 1, reserved: 1, expired: 0 });

        // Past the reservation timeout but inside the eligibility window.
        clock.advance_millis(TIMEOUT.as_millis() as i64 + 1);
        assert_eq!(store.purge_expired().await.unwrap(), 1);

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats, ClaimStatistics { committed: 1, reserved: 0, expired: 0 });
    }
}
