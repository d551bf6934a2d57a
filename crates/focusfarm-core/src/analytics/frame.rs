use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Dashboard time frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeFrame::Day),
            "week" => Ok(TimeFrame::Week),
            "month" => Ok(TimeFrame::Month),
            "year" => Ok(TimeFrame::Year),
            other => Err(format!("unknown time frame '{other}'")),
        }
    }
}

/// Half-open `[start, end)` date range covered by a frame at a reference
/// date. Days run midnight to midnight; weeks run Sunday to Sunday; months
/// and years follow the calendar.
pub fn frame_range(frame: TimeFrame, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    match frame {
        TimeFrame::Day => (reference, reference + Duration::days(1)),
        TimeFrame::Week => {
            let start =
                reference - Duration::days(reference.weekday().num_days_from_sunday() as i64);
            (start, start + Duration::days(7))
        }
        TimeFrame::Month => {
            let start = first_of_month(reference.year(), reference.month());
            (start, first_of_next_month(reference.year(), reference.month()))
        }
        TimeFrame::Year => (
            first_of_month(reference.year(), 1),
            first_of_month(reference.year() + 1, 1),
        ),
    }
}

pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> u64 {
    (end - start).num_days().max(0) as u64
}

pub(crate) fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

pub(crate) fn first_of_next_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_range_is_one_day() {
        let (start, end) = frame_range(TimeFrame::Day, day(2026, 8, 5));
        assert_eq!(start, day(2026, 8, 5));
        assert_eq!(end, day(2026, 8, 6));
        assert_eq!(days_in_range(start, end), 1);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2026-08-05 is a Wednesday; the containing week starts 2026-08-02.
        let (start, end) = frame_range(TimeFrame::Week, day(2026, 8, 5));
        assert_eq!(start, day(2026, 8, 2));
        assert_eq!(end, day(2026, 8, 9));

        // A Sunday reference starts its own week.
        let (start, _) = frame_range(TimeFrame::Week, day(2026, 8, 2));
        assert_eq!(start, day(2026, 8, 2));
    }

    #[test]
    fn month_range_follows_calendar() {
        let (start, end) = frame_range(TimeFrame::Month, day(2026, 2, 14));
        assert_eq!(start, day(2026, 2, 1));
        assert_eq!(end, day(2026, 3, 1));
        assert_eq!(days_in_range(start, end), 28);

        let (_, end) = frame_range(TimeFrame::Month, day(2026, 12, 31));
        assert_eq!(end, day(2027, 1, 1));
    }

    #[test]
    fn year_range_follows_calendar() {
        let (start, end) = frame_range(TimeFrame::Year, day(2026, 8, 5));
        assert_eq!(start, day(2026, 1, 1));
        assert_eq!(end, day(2027, 1, 1));
        assert_eq!(days_in_range(start, end), 365);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("week".parse::<TimeFrame>().unwrap(), TimeFrame::Week);
        assert_eq!("Year".parse::<TimeFrame>().unwrap(), TimeFrame::Year);
        assert!("fortnight".parse::<TimeFrame>().is_err());
    }
}
