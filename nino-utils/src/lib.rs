//! Shared utility functions for the nino crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, TimeDelta, Utc};

    /// Imagery for a given day is usually published about three days later.
    pub const PUBLICATION_LATENCY_DAYS: i64 = 3;

    /// Default length of the animation window, counted back from today.
    pub const DEFAULT_WINDOW_DAYS: i64 = 30;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Today's date in UTC, which is the calendar the imagery is indexed by.
    pub fn today_utc() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// The date `days` days before `from`.
    pub fn days_before(from: &NaiveDate, days: i64) -> NaiveDate {
        *from - TimeDelta::days(days)
    }

    /// Latest date that imagery can be expected for, given today's date.
    pub fn default_end_date(today: &NaiveDate) -> NaiveDate {
        days_before(today, PUBLICATION_LATENCY_DAYS)
    }

    /// Default first day of the animation window.
    pub fn default_start_date(today: &NaiveDate) -> NaiveDate {
        days_before(today, DEFAULT_WINDOW_DAYS)
    }

}
