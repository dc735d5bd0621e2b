//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use streak_api::DayStatus;
use streak_util::{format_iso_date, parse_iso_date};
use tracing::{debug, warn};

use crate::{DayRecord, DayStatusStore, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            -- One row per marked day; unmarked days have no row
            CREATE TABLE IF NOT EXISTS day_status (
                date TEXT PRIMARY KEY,
                status TEXT NOT NULL CHECK (status IN ('successful', 'unsuccessful')),
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn parse_row(date_str: &str, status_str: &str) -> Option<(NaiveDate, DayStatus)> {
    let date = match parse_iso_date(date_str) {
        Ok(date) => date,
        Err(e) => {
            warn!(date = %date_str, error = %e, "Skipping record with malformed date");
            return None;
        }
    };

    match status_str.parse::<DayStatus>() {
        Ok(status) => Some((date, status)),
        Err(e) => {
            warn!(date = %date_str, error = %e, "Skipping record with unknown status");
            None
        }
    }
}

impl DayStatusStore for SqliteStore {
    fn fetch_all(&self) -> StoreResult<BTreeMap<NaiveDate, DayStatus>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT date, status FROM day_status")?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(0)?;
            let status: String = row.get(1)?;
            Ok((date, status))
        })?;

        let mut days = BTreeMap::new();
        for row in rows {
            let (date_str, status_str) = row?;
            if let Some((date, status)) = parse_row(&date_str, &status_str) {
                days.insert(date, status);
            }
        }

        debug!(count = days.len(), "Fetched all day records");
        Ok(days)
    }

    fn get_record(&self, date: NaiveDate) -> StoreResult<Option<DayRecord>> {
        let conn = self.lock()?;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT status, updated_at FROM day_status WHERE date = ?",
                [format_iso_date(date)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((status_str, updated_str)) = row else {
            return Ok(None);
        };

        let status = status_str
            .parse::<DayStatus>()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_str)
            .map(|dt| dt.with_timezone(&Local))
            .unwrap_or_else(|_| streak_util::now());

        Ok(Some(DayRecord {
            date,
            status,
            updated_at,
        }))
    }

    fn write(&self, record: &DayRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        let date_str = format_iso_date(record.date);

        conn.execute(
            r#"
            INSERT INTO day_status (date, status, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(date)
            DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at
            "#,
            params![date_str, record.status.as_str(), record.updated_at.to_rfc3339()],
        )?;

        debug!(date = %date_str, status = %record.status, "Day record written");
        Ok(())
    }

    fn delete(&self, date: NaiveDate) -> StoreResult<()> {
        let conn = self.lock()?;
        let date_str = format_iso_date(date);
        let removed = conn.execute("DELETE FROM day_status WHERE date = ?", [&date_str])?;

        debug!(date = %date_str, removed, "Day record deleted");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_fetch() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .write(&DayRecord::new(day(26), DayStatus::Successful))
            .unwrap();
        store
            .write(&DayRecord::new(day(27), DayStatus::Unsuccessful))
            .unwrap();

        let days = store.fetch_all().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[&day(26)], DayStatus::Successful);
        assert_eq!(days[&day(27)], DayStatus::Unsuccessful);
    }

    #[test]
    fn test_write_overwrites() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .write(&DayRecord::new(day(26), DayStatus::Successful))
            .unwrap();
        store
            .write(&DayRecord::new(day(26), DayStatus::Unsuccessful))
            .unwrap();

        let days = store.fetch_all().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[&day(26)], DayStatus::Unsuccessful);

        let record = store.get_record(day(26)).unwrap().unwrap();
        assert_eq!(record.status, DayStatus::Unsuccessful);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .write(&DayRecord::new(day(26), DayStatus::Successful))
            .unwrap();
        store.delete(day(26)).unwrap();
        store.delete(day(26)).unwrap();

        assert!(store.get_record(day(26)).unwrap().is_none());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write(&DayRecord::new(day(26), DayStatus::Successful))
            .unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO day_status (date, status, updated_at) VALUES ('yesterday', 'successful', '')",
                [],
            )
            .unwrap();
        }

        let days = store.fetch_all().unwrap();
        assert_eq!(days.len(), 1);
        assert!(days.contains_key(&day(26)));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streakd.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .write(&DayRecord::new(day(28), DayStatus::Successful))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.fetch_all().unwrap()[&day(28)], DayStatus::Successful);
    }
}
