use chrono::{Datelike, NaiveDate};

use crate::pattern::DayOfWeek;

/// Number of days in the month containing `year`/`month` (28, 29, 30, or 31).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Inclusive iterator over calendar days from `start` through `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// The weekday of `date` in Mintee's Sunday=1..Saturday=7 numbering.
pub fn weekday_of(date: NaiveDate) -> DayOfWeek {
    DayOfWeek::from(date.weekday())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29); // leap year
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_date_range_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let days: Vec<NaiveDate> = date_range(start, end).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], start);
        assert_eq!(days[3], end);
    }

    #[test]
    fn test_weekday_numbering() {
        // 2025-03-02 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(weekday_of(sunday), DayOfWeek::Sunday);
        assert_eq!(u8::from(weekday_of(sunday)), 1);
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        assert_eq!(u8::from(weekday_of(saturday)), 7);
    }
}
