//! Month calendar projection
//!
//! Pages run oldest-first from the start date's month through today's month.
//! Weeks start on Monday.

use chrono::{Datelike, Month, NaiveDate};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use streak_api::CalendarPage;
use tracing::debug;

/// Build the page for a single month
pub fn month_page(year: i32, month: u32) -> Option<CalendarPage> {
    let start_date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end_date = last_day_of_month(year, month)?;
    let month_name = Month::try_from(u8::try_from(month).ok()?).ok()?.name();

    let offset = start_date.weekday().num_days_from_monday() as usize;
    let day_count = end_date.day() as usize;
    let week_count = (offset + day_count).div_ceil(7);

    let mut week_grid = vec![[None; 7]; week_count];
    for day in 1..=day_count {
        let cell = offset + day - 1;
        week_grid[cell / 7][cell % 7] = Some(day as u32);
    }

    Some(CalendarPage {
        year,
        month,
        month_name: month_name.to_string(),
        week_grid,
        start_date,
        end_date,
    })
}

/// Last calendar day of the given month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Most pages a single projection will hold. Older months are dropped first.
pub const MAX_CALENDAR_MONTHS: usize = 240;

/// Pages for every month from `start_date`'s month through `today`'s month,
/// keeping at most the last `MAX_CALENDAR_MONTHS`.
/// Empty when today falls in an earlier month than the start date.
pub fn month_pages(start_date: NaiveDate, today: NaiveDate) -> Vec<CalendarPage> {
    let last = month_index(today);
    let first = month_index(start_date).max(last - MAX_CALENDAR_MONTHS as i64 + 1);

    (first..=last)
        .filter_map(|index| {
            let year = i32::try_from(index.div_euclid(12)).ok()?;
            let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
            month_page(year, month)
        })
        .collect()
}

/// Months since year 0, January
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Calendar pages memoized per logical today, bounded by LRU eviction
pub struct CalendarCache {
    start_date: NaiveDate,
    pages: Mutex<LruCache<NaiveDate, Arc<Vec<CalendarPage>>>>,
}

impl CalendarCache {
    pub fn new(start_date: NaiveDate, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            start_date,
            pages: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_calendar(&self, today: NaiveDate) -> Arc<Vec<CalendarPage>> {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = pages.get(&today) {
            return Arc::clone(cached);
        }

        let generated = Arc::new(month_pages(self.start_date, today));
        debug!(today = %today, months = generated.len(), "Calendar pages generated");
        pages.put(today, Arc::clone(&generated));
        generated
    }

    /// Number of distinct days currently cached
    pub fn len(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
