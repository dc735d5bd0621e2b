//! Mock store for testing

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use streak_api::DayStatus;

use crate::{DayRecord, DayStatusStore, StoreError, StoreResult};

/// In-memory store with failure and latency injection
pub struct MockStore {
    records: Arc<Mutex<BTreeMap<NaiveDate, DayRecord>>>,
    fetch_count: AtomicU64,

    /// Configure fetch_all to fail
    pub fail_fetch: Arc<Mutex<bool>>,

    /// Configure write/delete to fail
    pub fail_write: Arc<Mutex<bool>>,

    /// Sleep this long inside fetch_all (simulates a slow backend)
    pub fetch_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            fetch_count: AtomicU64::new(0),
            fail_fetch: Arc::new(Mutex::new(false)),
            fail_write: Arc::new(Mutex::new(false)),
            fetch_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed records without going through `write`
    pub fn with_days(self, days: impl IntoIterator<Item = (NaiveDate, DayStatus)>) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            for (date, status) in days {
                records.insert(date, DayRecord::new(date, status));
            }
        }
        self
    }

    /// Number of fetch_all calls that reached the backend (including failures)
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        *self.fail_fetch.lock().unwrap() = fail;
    }

    pub fn set_fail_write(&self, fail: bool) {
        *self.fail_write.lock().unwrap() = fail;
    }

    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock().unwrap() = delay;
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DayStatusStore for MockStore {
    fn fetch_all(&self) -> StoreResult<BTreeMap<NaiveDate, DayStatus>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        // Copy the records before sleeping so a slow fetch returns the state
        // as of when it started
        let snapshot: BTreeMap<NaiveDate, DayStatus> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(date, record)| (*date, record.status))
            .collect();

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        if *self.fail_fetch.lock().unwrap() {
            return Err(StoreError::Unavailable("Mock fetch failure".into()));
        }

        Ok(snapshot)
    }

    fn get_record(&self, date: NaiveDate) -> StoreResult<Option<DayRecord>> {
        Ok(self.records.lock().unwrap().get(&date).cloned())
    }

    fn write(&self, record: &DayRecord) -> StoreResult<()> {
        if *self.fail_write.lock().unwrap() {
            return Err(StoreError::Unavailable("Mock write failure".into()));
        }

        self.records
            .lock()
            .unwrap()
            .insert(record.date, record.clone());
        Ok(())
    }

    fn delete(&self, date: NaiveDate) -> StoreResult<()> {
        if *self.fail_write.lock().unwrap() {
            return Err(StoreError::Unavailable("Mock delete failure".into()));
        }

        self.records.lock().unwrap().remove(&date);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !*self.fail_fetch.lock().unwrap()
    }
}
