//! Text rendering for `show` and `status`

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt::Write;
use streak_api::DayStatus;
use streak_core::StreakResult;

/// Marked days grouped by month, oldest month first, days ascending
pub fn render_marked_days(days: &BTreeMap<NaiveDate, DayStatus>) -> String {
    if days.is_empty() {
        return "No marked days found.\n".to_string();
    }

    let mut out = String::from("Marked days\n");
    let mut current_month = None;

    for (date, status) in days {
        let month = (date.year(), date.month());
        if current_month != Some(month) {
            current_month = Some(month);
            let _ = writeln!(out, "\n{}:", date.format("%B %Y"));
        }
        let _ = writeln!(out, "  {:2}: {} {}", date.day(), status_icon(*status), status);
    }

    out
}

fn status_icon(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Successful => "[x]",
        DayStatus::Unsuccessful => "[ ]",
    }
}

/// How long ago the most recent successful day was
pub fn last_success_recency(last_success: NaiveDate, today: NaiveDate) -> String {
    match (today - last_success).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n if n < 0 => format!("{} days from now", -n),
        n => format!("{} days ago", n),
    }
}

/// Counts, current streak and recency of the last successful day
pub fn render_status(
    result: &StreakResult,
    last_success: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    let mut out = String::from("Current status\n");
    let _ = writeln!(out, "Successful days:   {}", result.successful_days);
    let _ = writeln!(out, "Unsuccessful days: {}", result.unsuccessful_days);
    let _ = writeln!(out, "Total marked days: {}", result.total_marked_days);
    let _ = writeln!(out, "Success rate:      {:.1}%", result.success_rate);
    let _ = writeln!(out, "Current streak:    {}", result.current_streak);

    if let Some(last) = last_success {
        let _ = writeln!(
            out,
            "Last successful:   {}",
            last_success_recency(last, today)
        );
    }

    out
}

/// Most recent successful day on or before `today`
pub fn last_success(days: &BTreeMap<NaiveDate, DayStatus>, today: NaiveDate) -> Option<NaiveDate> {
    days.range(..=today)
        .rev()
        .find(|(_, status)| **status == DayStatus::Successful)
        .map(|(date, _)| *date)
}
