//! Streak service: the operations exposed to the IPC layer

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use streak_api::{DayStatus, HealthStatus, MarkState, StreakView, ToggleOutcome};
use streak_config::Settings;
use streak_store::{DayRecord, DayStatusStore, StoreError};
use streak_util::{format_iso_date, parse_iso_date, Result, TrackerError};
use tracing::{debug, info, warn};

use crate::backend::call_store;
use crate::{
    derive, next_state, parse_current_status, CalendarCache, SnapshotCache, TransitionEffect,
};

/// Reads go through the snapshot cache; toggles write through to the store
/// and invalidate it.
pub struct StreakService {
    start_date: NaiveDate,
    store: Arc<dyn DayStatusStore>,
    store_timeout: Duration,
    snapshots: SnapshotCache,
    calendars: CalendarCache,
}

impl StreakService {
    pub fn new(settings: &Settings, store: Arc<dyn DayStatusStore>) -> Self {
        info!(
            start_date = %settings.start_date,
            ttl_secs = settings.cache.snapshot_ttl.as_secs(),
            calendar_capacity = settings.cache.calendar_capacity,
            "Streak service initialized"
        );

        Self {
            start_date: settings.start_date,
            snapshots: SnapshotCache::new(
                Arc::clone(&store),
                settings.cache.snapshot_ttl,
                settings.cache.store_timeout,
            ),
            calendars: CalendarCache::new(settings.start_date, settings.cache.calendar_capacity),
            store,
            store_timeout: settings.cache.store_timeout,
        }
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    pub fn calendars(&self) -> &CalendarCache {
        &self.calendars
    }

    /// Streak, statistics and calendar as of `today`
    pub async fn get_streak(&self, today: NaiveDate) -> StreakView {
        let snapshot = self.snapshots.get().await;
        let days_since_start = (today - self.start_date).num_days();
        let months_data = self.calendars.get_calendar(today);

        if snapshot.is_unavailable() {
            let current_streak = u32::try_from(days_since_start.max(0)).unwrap_or(u32::MAX);
            warn!(
                current_streak,
                "Store unavailable, approximating streak from days since start"
            );

            return StreakView {
                start_date: self.start_date,
                current_streak,
                days_since_start,
                success_rate: 0.0,
                successful_days: 0,
                unsuccessful_days: 0,
                total_marked_days: 0,
                months_data,
                today,
                marked_days: BTreeMap::new(),
                degraded: true,
            };
        }

        let result = derive(&snapshot, self.start_date, today);
        debug!(
            today = %today,
            current_streak = result.current_streak,
            success_rate = result.success_rate,
            "Streak derived"
        );

        StreakView {
            start_date: self.start_date,
            current_streak: result.current_streak,
            days_since_start,
            success_rate: result.success_rate,
            successful_days: result.successful_days,
            unsuccessful_days: result.unsuccessful_days,
            total_marked_days: result.total_marked_days,
            months_data,
            today,
            marked_days: snapshot.to_wire(),
            degraded: false,
        }
    }

    /// Every marked day. Empty when the store is unreachable and nothing is cached.
    pub async fn get_marked_days(&self) -> BTreeMap<String, DayStatus> {
        self.snapshots.get().await.to_wire()
    }

    /// Advance `date` to the state after `current_status`.
    ///
    /// Malformed dates are rejected before the store is touched. Store
    /// failures are returned to the caller.
    pub async fn toggle_day(
        &self,
        date: &str,
        current_status: Option<&str>,
    ) -> Result<ToggleOutcome> {
        let date = parse_iso_date(date)?;

        let current = parse_current_status(current_status);
        if current.is_none() {
            debug!(current_status = ?current_status, "Unrecognized current status");
        }
        let next = next_state(current);

        let result = match TransitionEffect::entering(next) {
            TransitionEffect::Upsert(status) => {
                let record = DayRecord::new(date, status);
                call_store(&self.store, self.store_timeout, "write", move |s| {
                    s.write(&record)
                })
                .await
            }
            TransitionEffect::Delete => {
                match call_store(&self.store, self.store_timeout, "delete", move |s| {
                    s.delete(date)
                })
                .await
                {
                    Err(StoreError::NotFound(_)) => Ok(()),
                    other => other,
                }
            }
        };

        // A failed call may still have reached the store
        self.snapshots.invalidate();

        if let Err(e) = result {
            warn!(date = %date, to = %next, error = %e, "Toggle failed");
            return Err(TrackerError::backend(e.to_string()));
        }

        info!(
            date = %date,
            from = ?current.map(|s| s.as_str()),
            to = %next,
            "Day toggled"
        );

        Ok(ToggleOutcome {
            date,
            new_status: next,
            message: toggle_message(date, next),
        })
    }

    /// Service health, including whether the store answers within the timeout
    pub async fn health(&self) -> HealthStatus {
        let store_healthy = call_store(&self.store, self.store_timeout, "health", |s| {
            Ok(s.is_healthy())
        })
        .await
        .unwrap_or(false);

        HealthStatus {
            status: if store_healthy { "healthy" } else { "degraded" }.to_string(),
            store_healthy,
            timestamp: streak_util::now(),
        }
    }
}

fn toggle_message(date: NaiveDate, state: MarkState) -> String {
    format!("Day {} set to {}", format_iso_date(date), state)
}
