//! Calendar helpers shared by reports, imports and attendance.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Today's date on the server clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|n| n - Duration::days(1)).unwrap_or(first)
}

/// `YYYY-MM` or a full date; returns the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    parse_flexible_date(value)
        .or_else(|| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok())
        .map(first_of_month)
}

/// Monday = 0 .. Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_monday() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_flexible_date_formats() {
        assert_eq!(parse_flexible_date("2014-05-09"), Some(d(2014, 5, 9)));
        assert_eq!(parse_flexible_date(" 09/05/2014 "), Some(d(2014, 5, 9)));
        assert_eq!(parse_flexible_date("2014/05/09"), None);
        assert_eq!(parse_flexible_date("31/02/2014"), None);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_of_month(d(2025, 2, 17)), d(2025, 2, 1));
        assert_eq!(last_of_month(d(2024, 2, 3)), d(2024, 2, 29));
        assert_eq!(last_of_month(d(2025, 12, 25)), d(2025, 12, 31));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-03"), Some(d(2025, 3, 1)));
        assert_eq!(parse_month("2025-03-18"), Some(d(2025, 3, 1)));
        assert_eq!(parse_month("March"), None);
    }

    #[test]
    fn test_weekday_index() {
        assert_eq!(weekday_index(d(2025, 3, 3)), 0);
        assert_eq!(weekday_index(d(2025, 3, 9)), 6);
    }
}
