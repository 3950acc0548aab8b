use chrono::NaiveDate;

/// Format a date as `YYYY-MM-DD`, the form every stored record uses.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` string. Unparseable input is `None`, never an error.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn add_days(d: NaiveDate, n: i64) -> NaiveDate {
    d + chrono::Duration::days(n)
}

/// Whole days from `a` to `b` (positive when `b` is later).
pub fn day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Today as a local calendar date. The engine itself always takes dates
/// explicitly; this is for callers at the presentation boundary.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
