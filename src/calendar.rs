use crate::errors::{AppError, AppResult};
use crate::models::DayKey;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};

/// Number of days looked back from the reference day. The window is
/// `[day - WINDOW_DAYS, day]`, both ends inclusive.
pub const WINDOW_DAYS: u64 = 14;

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn day_key(date: NaiveDate) -> DayKey {
    day_start(date).timestamp()
}

pub fn from_day_key(key: DayKey) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(key, 0).map(|dt| dt.date_naive())
}

/// Truncates a timestamp to the calendar day it falls on in its own zone.
///
/// A late-evening local time stays on the local day rather than rolling over
/// to the UTC day.
pub fn normalize<Tz: TimeZone>(dt: &DateTime<Tz>) -> NaiveDate {
    dt.date_naive()
}

pub fn today() -> NaiveDate {
    normalize(&Local::now())
}

pub fn window_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

pub fn same_month(left: NaiveDate, right: NaiveDate) -> bool {
    left.year() == right.year() && left.month() == right.month()
}

/// Parses a day given on the command line.
pub fn parse_day(raw: &str) -> AppResult<NaiveDate> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "today" => return Ok(today()),
        "yesterday" => {
            return today()
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| AppError::Cli("date out of range".to_string()))
        }
        _ => {}
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|error| AppError::Cli(format!("invalid date '{}': {}", trimmed, error)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn day_key_is_utc_midnight() {
        assert_eq!(day_key(ymd(1970, 1, 2)), 86_400);
        assert_eq!(day_key(ymd(2024, 10, 3)), 1_727_913_600);
        assert_eq!(from_day_key(1_727_913_600), Some(ymd(2024, 10, 3)));
    }

    #[test]
    fn window_spans_fourteen_days_back() {
        assert_eq!(window_start(ymd(2024, 10, 15)), ymd(2024, 10, 1));
        assert_eq!(window_start(ymd(2024, 3, 5)), ymd(2024, 2, 20));
    }

    #[test]
    fn normalize_keeps_the_local_calendar_day() {
        let offset = FixedOffset::west_opt(7 * 3600).expect("offset");
        let late_evening = offset
            .with_ymd_and_hms(2024, 10, 3, 23, 30, 0)
            .single()
            .expect("local time");
        assert_eq!(normalize(&late_evening), ymd(2024, 10, 3));
    }

    #[test]
    fn parse_day_accepts_iso_dates_and_rejects_garbage() {
        assert_eq!(parse_day(" 2024-02-29 ").expect("parse"), ymd(2024, 2, 29));
        assert_eq!(parse_day("today").expect("today"), today());
        assert!(matches!(parse_day("2024-02-30"), Err(AppError::Cli(_))));
        assert!(matches!(parse_day("next week"), Err(AppError::Cli(_))));
    }

    #[test]
    fn same_month_compares_year_and_month() {
        assert!(same_month(ymd(2024, 10, 1), ymd(2024, 10, 31)));
        assert!(!same_month(ymd(2024, 10, 1), ymd(2023, 10, 1)));
        assert!(!same_month(ymd(2024, 9, 30), ymd(2024, 10, 1)));
    }
}
