//! Streak and success-rate derivation
//!
//! Everything here is a pure function of a snapshot, the start date and the
//! logical today. Dates before the start date or after today never count.
//!
//! Streak rules:
//! - Walking back from today, unmarked days are skipped until the most recent
//!   mark. If that mark is unsuccessful the streak is zero.
//! - From that successful day, consecutive successful days are counted
//!   backwards. An unsuccessful day or an unmarked gap ends the count.

use chrono::NaiveDate;
use streak_api::DayStatus;

use crate::Snapshot;

/// Statistics derived from a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct StreakResult {
    pub current_streak: u32,
    pub successful_days: u32,
    pub unsuccessful_days: u32,
    pub total_marked_days: u32,
    /// Percentage of marked days that were successful, one decimal place
    pub success_rate: f64,
}

/// Derive the streak and statistics as of `today`
pub fn derive(snapshot: &Snapshot, start_date: NaiveDate, today: NaiveDate) -> StreakResult {
    let (successful_days, unsuccessful_days) = count_outcomes(snapshot, start_date, today);

    StreakResult {
        current_streak: current_streak(snapshot, start_date, today),
        successful_days,
        unsuccessful_days,
        total_marked_days: successful_days + unsuccessful_days,
        success_rate: success_rate(successful_days, unsuccessful_days),
    }
}

/// Successful and unsuccessful days in `[start_date, today]`
pub fn count_outcomes(snapshot: &Snapshot, start_date: NaiveDate, today: NaiveDate) -> (u32, u32) {
    if today < start_date {
        return (0, 0);
    }

    snapshot
        .days()
        .range(start_date..=today)
        .fold((0, 0), |(ok, failed), (_, status)| match status {
            DayStatus::Successful => (ok + 1, failed),
            DayStatus::Unsuccessful => (ok, failed + 1),
        })
}

/// Length of the run of successful days ending at the most recent mark
pub fn current_streak(snapshot: &Snapshot, start_date: NaiveDate, today: NaiveDate) -> u32 {
    if today < start_date {
        return 0;
    }

    let days = snapshot.days();

    let anchor = match days.range(start_date..=today).next_back() {
        Some((date, DayStatus::Successful)) => *date,
        _ => return 0,
    };

    let mut streak = 0;
    let mut expected = Some(anchor);
    for (date, status) in days.range(start_date..=anchor).rev() {
        // A skipped date means an unmarked gap
        if Some(*date) != expected || *status != DayStatus::Successful {
            break;
        }
        streak += 1;
        expected = date.pred_opt();
    }

    streak
}

/// `successful / (successful + unsuccessful) * 100`, rounded to one decimal.
/// Zero when nothing is marked.
pub fn success_rate(successful_days: u32, unsuccessful_days: u32) -> f64 {
    let total = successful_days + unsuccessful_days;
    if total == 0 {
        return 0.0;
    }

    let percent = f64::from(successful_days) / f64::from(total) * 100.0;
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn start() -> NaiveDate {
        day(26)
    }

    fn snapshot(days: &[(NaiveDate, DayStatus)]) -> Snapshot {
        Snapshot::new(days.iter().copied().collect(), streak_util::now())
    }

    fn four_wins_then_loss() -> Vec<(NaiveDate, DayStatus)> {
        vec![
            (day(26), DayStatus::Successful),
            (day(27), DayStatus::Successful),
            (day(28), DayStatus::Successful),
            (day(29), DayStatus::Successful),
            (day(30), DayStatus::Unsuccessful),
        ]
    }

    #[test]
    fn test_failure_today_breaks_streak() {
        let snap = snapshot(&four_wins_then_loss());
        assert_eq!(current_streak(&snap, start(), day(30)), 0);
    }

    #[test]
    fn test_streak_before_failure() {
        let snap = snapshot(&four_wins_then_loss());
        assert_eq!(current_streak(&snap, start(), day(29)), 4);
    }

    #[test]
    fn test_gap_ends_streak() {
        let mut days = four_wins_then_loss();
        days.retain(|(date, _)| *date != day(28));
        let snap = snapshot(&days);

        assert_eq!(current_streak(&snap, start(), day(29)), 1);
    }

    #[test]
    fn test_unmarked_today_skipped() {
        let snap = snapshot(&[
            (day(26), DayStatus::Successful),
            (day(27), DayStatus::Successful),
        ]);

        // 28 and 29 are unmarked; the search walks back to the 27th
        assert_eq!(current_streak(&snap, start(), day(29)), 2);
    }

    #[test]
    fn test_failure_after_last_success() {
        let snap = snapshot(&[
            (day(26), DayStatus::Successful),
            (day(28), DayStatus::Unsuccessful),
        ]);

        assert_eq!(current_streak(&snap, start(), day(31)), 0);
    }

    #[test]
    fn test_marks_outside_range_ignored() {
        let before_start = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        let snap = snapshot(&[
            (before_start, DayStatus::Successful),
            (day(26), DayStatus::Successful),
            (day(27), DayStatus::Successful),
            (day(28), DayStatus::Unsuccessful),
        ]);

        // The 25th would extend the run but predates the start date
        assert_eq!(current_streak(&snap, start(), day(27)), 2);
        // The 28th is in the future relative to the 27th
        let result = derive(&snap, start(), day(27));
        assert_eq!(result.successful_days, 2);
        assert_eq!(result.unsuccessful_days, 0);
    }

    #[test]
    fn test_today_before_start() {
        let snap = snapshot(&four_wins_then_loss());
        let result = derive(&snap, start(), day(20));

        assert_eq!(result.current_streak, 0);
        assert_eq!(result.total_marked_days, 0);
        assert_eq!(result.success_rate, 0.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = Snapshot::new(BTreeMap::new(), streak_util::now());
        let result = derive(&snap, start(), day(31));

        assert_eq!(result.current_streak, 0);
        assert_eq!(result.successful_days, 0);
        assert_eq!(result.success_rate, 0.0);
    }

    #[test]
    fn test_aggregate_counts() {
        let snap = snapshot(&four_wins_then_loss());
        let result = derive(&snap, start(), day(31));

        assert_eq!(result.successful_days, 4);
        assert_eq!(result.unsuccessful_days, 1);
        assert_eq!(result.total_marked_days, 5);
        assert_eq!(result.success_rate, 80.0);
    }

    #[test]
    fn test_success_rate_rounding() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(1, 2), 33.3);
        assert_eq!(success_rate(2, 1), 66.7);
        assert_eq!(success_rate(5, 0), 100.0);
        assert_eq!(success_rate(0, 3), 0.0);
    }

    /// Day-by-day walk used as an independent reference
    fn reference_streak(snap: &Snapshot, start: NaiveDate, today: NaiveDate) -> u32 {
        let mut cursor = today;
        let mut anchor = None;
        while cursor >= start {
            match snap.days().get(&cursor) {
                Some(DayStatus::Successful) => {
                    anchor = Some(cursor);
                    break;
                }
                Some(DayStatus::Unsuccessful) => break,
                None => {}
            }
            cursor = cursor.pred_opt().unwrap();
        }

        let Some(mut cursor) = anchor else {
            return 0;
        };
        let mut streak = 0;
        while cursor >= start && snap.days().get(&cursor) == Some(&DayStatus::Successful) {
            streak += 1;
            cursor = cursor.pred_opt().unwrap();
        }
        streak
    }

    #[test]
    fn test_matches_reference_for_every_pattern() {
        // Every assignment of {unmarked, successful, unsuccessful} to the
        // seven days from 2025-08-25 (one day before start) to 2025-08-31
        let first = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        let span = 7u32;

        for pattern in 0..3u32.pow(span) {
            let mut days = BTreeMap::new();
            let mut code = pattern;
            for offset in 0..span {
                let date = first + chrono::Duration::days(i64::from(offset));
                match code % 3 {
                    1 => {
                        days.insert(date, DayStatus::Successful);
                    }
                    2 => {
                        days.insert(date, DayStatus::Unsuccessful);
                    }
                    _ => {}
                }
                code /= 3;
            }
            let snap = Snapshot::new(days, streak_util::now());

            for today_offset in 0..=span {
                let today = first + chrono::Duration::days(i64::from(today_offset));
                let streak = current_streak(&snap, start(), today);

                assert_eq!(
                    streak,
                    reference_streak(&snap, start(), today),
                    "pattern {pattern} today {today}"
                );

                let upper = (today - start()).num_days() + 1;
                assert!(i64::from(streak) <= upper.max(0));
            }
        }
    }
}
