//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate};
use std::collections::BTreeMap;
use streak_api::DayStatus;

use crate::StoreResult;

/// Durable mapping of date to day status.
///
/// Unmarked days are represented by the absence of a record.
pub trait DayStatusStore: Send + Sync {
    /// Read every record
    fn fetch_all(&self) -> StoreResult<BTreeMap<NaiveDate, DayStatus>>;

    /// Read a single record with its metadata
    fn get_record(&self, date: NaiveDate) -> StoreResult<Option<DayRecord>>;

    /// Insert or overwrite the record for `record.date`
    fn write(&self, record: &DayRecord) -> StoreResult<()>;

    /// Remove the record for `date`. Removing a missing record is not an error.
    fn delete(&self, date: NaiveDate) -> StoreResult<()>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// A stored day outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub updated_at: DateTime<Local>,
}

impl DayRecord {
    /// New record stamped with the current time
    pub fn new(date: NaiveDate, status: DayStatus) -> Self {
        Self {
            date,
            status,
            updated_at: streak_util::now(),
        }
    }
}
