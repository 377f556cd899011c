//! Date helper functions

use chrono::{Local, NaiveDate};

/// Parse a `YYYY-MM-DD` string
fn parse(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Format a `YYYY-MM-DD` string as "Jan 02, 2006"
///
/// Empty input gives an empty string; anything unparseable is returned as-is.
///
/// # Examples
/// ```ignore
/// format_date("2024-01-15") // -> "Jan 15, 2024"
/// ```
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    match parse(date) {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// Relative age of a `YYYY-MM-DD` date, measured from today
pub fn time_ago(date: &str) -> String {
    time_ago_from(date, Local::now().date_naive())
}

/// Relative age of a `YYYY-MM-DD` date, measured from `today`
///
/// Months are 30 days and years 12 months, so the output is coarse on
/// purpose. Future dates read as "Today".
pub fn time_ago_from(date: &str, today: NaiveDate) -> String {
    if date.is_empty() {
        return String::new();
    }
    let Some(then) = parse(date) else {
        return date.to_string();
    };

    let days = today.signed_duration_since(then).num_days();
    let months = days / 30;
    let years = months / 12;

    if years > 0 {
        plural(years, "year")
    } else if months > 0 {
        plural(months, "month")
    } else if days > 0 {
        plural(days, "day")
    } else {
        "Today".to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-15"), "Jan 15, 2024");
        assert_eq!(format_date("2025-11-07"), "Nov 07, 2025");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("Present"), "Present");
    }

    #[test]
    fn test_time_ago() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(time_ago_from("2025-06-15", today), "Today");
        assert_eq!(time_ago_from("2025-06-20", today), "Today");
        assert_eq!(time_ago_from("2025-06-14", today), "1 day ago");
        assert_eq!(time_ago_from("2025-06-01", today), "14 days ago");
        assert_eq!(time_ago_from("2025-05-01", today), "1 month ago");
        assert_eq!(time_ago_from("2025-01-01", today), "5 months ago");
        assert_eq!(time_ago_from("2024-06-01", today), "1 year ago");
        assert_eq!(time_ago_from("2020-01-01", today), "5 years ago");
        assert_eq!(time_ago_from("soon", today), "soon");
        assert_eq!(time_ago_from("", today), "");
    }
}
