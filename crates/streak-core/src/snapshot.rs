//! Point-in-time views of the day-status history and the cache that serves them

use chrono::{DateTime, Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use streak_api::{DayStatus, MarkState};
use streak_store::DayStatusStore;
use streak_util::{format_iso_date, MonotonicInstant};
use tracing::{debug, warn};

use crate::backend::call_store;

/// Where a snapshot's contents came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotOrigin {
    /// Read from the store
    Store,
    /// Placeholder served because the store failed and nothing was cached yet
    Unavailable,
}

/// Immutable copy of every day record at a point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    days: BTreeMap<NaiveDate, DayStatus>,
    captured_at: DateTime<Local>,
    origin: SnapshotOrigin,
}

impl Snapshot {
    pub fn new(days: BTreeMap<NaiveDate, DayStatus>, captured_at: DateTime<Local>) -> Self {
        Self {
            days,
            captured_at,
            origin: SnapshotOrigin::Store,
        }
    }

    /// Empty snapshot standing in for an unreachable store
    pub fn unavailable() -> Self {
        Self {
            days: BTreeMap::new(),
            captured_at: streak_util::now(),
            origin: SnapshotOrigin::Unavailable,
        }
    }

    pub fn status(&self, date: NaiveDate) -> MarkState {
        MarkState::from(self.days.get(&date).copied())
    }

    pub fn days(&self) -> &BTreeMap<NaiveDate, DayStatus> {
        &self.days
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn is_unavailable(&self) -> bool {
        self.origin == SnapshotOrigin::Unavailable
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Date-string keyed mapping for the wire
    pub fn to_wire(&self) -> BTreeMap<String, DayStatus> {
        self.days
            .iter()
            .map(|(date, status)| (format_iso_date(*date), *status))
            .collect()
    }
}

struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    fetched_at: MonotonicInstant,
}

#[derive(Default)]
struct Slot {
    /// Snapshot served while younger than the TTL. Cleared by `invalidate`.
    current: Option<CachedSnapshot>,
    /// Most recent successful read, kept across invalidation for fallback
    last_known: Option<Arc<Snapshot>>,
    /// Bumped by every `invalidate`
    generation: u64,
}

/// Single-slot read-through cache over the store.
///
/// Concurrent misses are collapsed into one store read. A read that was
/// already in flight when `invalidate` ran is returned to its own caller but
/// never installed, so the next `get` after a write always refetches.
pub struct SnapshotCache {
    store: Arc<dyn DayStatusStore>,
    ttl: Duration,
    timeout: Duration,
    slot: RwLock<Slot>,
    refresh: tokio::sync::Mutex<()>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn DayStatusStore>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            timeout,
            slot: RwLock::new(Slot::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Current snapshot, refetching when missing or older than the TTL.
    ///
    /// Never fails: when the store cannot be read this returns the last
    /// snapshot that was read successfully, or an unavailable placeholder.
    pub async fn get(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self.fresh() {
            debug!("Snapshot cache hit");
            return snapshot;
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(snapshot) = self.fresh() {
            debug!("Snapshot refreshed by concurrent caller");
            return snapshot;
        }

        let generation = self.read_slot().generation;
        let result = call_store(&self.store, self.timeout, "fetch_all", |s| s.fetch_all()).await;

        let mut slot = self.write_slot();
        match result {
            Ok(days) => {
                let snapshot = Arc::new(Snapshot::new(days, streak_util::now()));
                if slot.generation == generation {
                    slot.current = Some(CachedSnapshot {
                        snapshot: Arc::clone(&snapshot),
                        fetched_at: MonotonicInstant::now(),
                    });
                } else {
                    debug!("Snapshot invalidated during refetch, not caching");
                }
                slot.last_known = Some(Arc::clone(&snapshot));
                debug!(days = snapshot.len(), "Snapshot refetched");
                snapshot
            }
            Err(e) => match &slot.last_known {
                Some(previous) => {
                    warn!(
                        error = %e,
                        captured_at = %previous.captured_at(),
                        "Store read failed, serving last known snapshot"
                    );
                    Arc::clone(previous)
                }
                None => {
                    warn!(error = %e, "Store read failed and no snapshot is cached");
                    Arc::new(Snapshot::unavailable())
                }
            },
        }
    }

    /// Drop the cached snapshot so the next `get` reads the store
    pub fn invalidate(&self) {
        let mut slot = self.write_slot();
        slot.current = None;
        slot.generation = slot.generation.wrapping_add(1);
        debug!(generation = slot.generation, "Snapshot cache invalidated");
    }

    /// Whether a snapshot younger than the TTL is cached
    pub fn is_fresh(&self) -> bool {
        self.fresh().is_some()
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        self.read_slot()
            .current
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.snapshot))
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streak_store::{DayRecord, MockStore};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn cache_over(store: &Arc<MockStore>, ttl: Duration) -> SnapshotCache {
        SnapshotCache::new(store.clone(), ttl, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_hit_within_ttl_returns_same_snapshot() {
        let store = Arc::new(MockStore::new().with_days([(day(26), DayStatus::Successful)]));
        let cache = cache_over(&store, Duration::from_secs(60));

        let first = cache.get().await;
        let second = cache.get().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.captured_at(), second.captured_at());
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(first.status(day(26)), MarkState::Successful);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let store = Arc::new(MockStore::new());
        let cache = cache_over(&store, Duration::from_secs(60));

        let first = cache.get().await;
        assert!(cache.is_fresh());

        cache.invalidate();
        assert!(!cache.is_fresh());

        let second = cache.get().await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_refetch_after_ttl() {
        let store = Arc::new(MockStore::new());
        let cache = cache_over(&store, Duration::from_millis(40));

        cache.get().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.get().await;

        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_serves_last_known() {
        let store = Arc::new(MockStore::new().with_days([(day(27), DayStatus::Successful)]));
        let cache = cache_over(&store, Duration::from_secs(60));

        let good = cache.get().await;
        cache.invalidate();
        store.set_fail_fetch(true);

        let fallback = cache.get().await;
        assert!(Arc::ptr_eq(&good, &fallback));
        assert!(!fallback.is_unavailable());
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_history_is_unavailable() {
        let store = Arc::new(MockStore::new());
        store.set_fail_fetch(true);
        let cache = cache_over(&store, Duration::from_secs(60));

        let snapshot = cache.get().await;
        assert!(snapshot.is_unavailable());
        assert!(snapshot.is_empty());

        // Failures are not cached
        cache.get().await;
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let store = Arc::new(MockStore::new());
        store.set_fetch_delay(Some(Duration::from_millis(300)));
        let cache = SnapshotCache::new(
            store.clone(),
            Duration::from_secs(60),
            Duration::from_millis(20),
        );

        let snapshot = cache.get().await;
        assert!(snapshot.is_unavailable());
        assert!(!cache.is_fresh());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_fetch_once() {
        let store = Arc::new(MockStore::new());
        store.set_fetch_delay(Some(Duration::from_millis(50)));
        let cache = Arc::new(cache_over(&store, Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get().await })
            })
            .collect();

        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap());
        }

        assert_eq!(store.fetch_count(), 1);
        assert!(snapshots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalidate_wins_over_inflight_refetch() {
        let store = Arc::new(MockStore::new());
        store.set_fetch_delay(Some(Duration::from_millis(200)));
        let cache = Arc::new(cache_over(&store, Duration::from_secs(60)));

        let in_flight = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get().await })
        };

        // Let the slow read copy the (empty) records, then write and invalidate
        tokio::time::sleep(Duration::from_millis(50)).await;
        store
            .write(&DayRecord::new(day(26), DayStatus::Successful))
            .unwrap();
        cache.invalidate();

        let stale = in_flight.await.unwrap();
        assert_eq!(stale.status(day(26)), MarkState::Unmarked);

        store.set_fetch_delay(None);
        let fresh = cache.get().await;
        assert_eq!(fresh.status(day(26)), MarkState::Successful);
        assert_eq!(store.fetch_count(), 2);
    }

    #[test]
    fn test_to_wire() {
        let mut days = BTreeMap::new();
        days.insert(day(26), DayStatus::Successful);
        days.insert(day(30), DayStatus::Unsuccessful);
        let snapshot = Snapshot::new(days, streak_util::now());

        let wire = snapshot.to_wire();
        assert_eq!(wire.get("2025-08-26"), Some(&DayStatus::Successful));
        assert_eq!(wire.get("2025-08-30"), Some(&DayStatus::Unsuccessful));
        assert_eq!(snapshot.status(day(27)), MarkState::Unmarked);
    }
}
