use chrono::{Datelike, Duration, NaiveDate, Timelike};
use serde::Serialize;

use super::frame::{days_in_range, frame_range, TimeFrame};
use crate::ledger::MINUTES_PER_HEN;
use crate::remote::StudySession;

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One labeled bar of the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub minutes: u64,
}

/// One cell of the month view's week-aligned grid. Leading and trailing
/// cells belong to the adjacent months and are flagged accordingly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub minutes: u64,
    pub in_current_month: bool,
}

/// Aggregated dashboard data for one frame at one reference date.
///
/// `buckets` carries the day (24 hours), week (7 weekdays), and year
/// (12 months) views; the month view uses `grid` instead. Totals and
/// averages always cover the frame's own range, not the grid padding.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub frame: TimeFrame,
    pub range_start: NaiveDate,
    /// Exclusive.
    pub range_end: NaiveDate,
    pub total_minutes: u64,
    /// Display-only projection of the range's focus time in hens; the real
    /// hen counter lives in the ledger.
    pub hens_earned: u64,
    pub daily_average: f64,
    pub buckets: Vec<Bucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<DayCell>>,
}

/// Sum of `duration_min` for sessions started within `[start, end)`.
pub fn minutes_in_range(sessions: &[StudySession], start: NaiveDate, end: NaiveDate) -> u64 {
    sessions
        .iter()
        .filter(|s| {
            let date = s.started_at.date_naive();
            date >= start && date < end
        })
        .map(|s| s.duration_min)
        .sum()
}

/// Build the dashboard report for one frame. A session is attributed to the
/// bucket containing its start instant; sessions outside the range are
/// ignored (except as month-grid padding).
pub fn build_report(
    sessions: &[StudySession],
    frame: TimeFrame,
    reference: NaiveDate,
) -> ActivityReport {
    let (start, end) = frame_range(frame, reference);
    let total_minutes = minutes_in_range(sessions, start, end);
    let days = days_in_range(start, end);

    let in_range = |s: &&StudySession| {
        let date = s.started_at.date_naive();
        date >= start && date < end
    };

    let (buckets, grid) = match frame {
        TimeFrame::Day => {
            let mut minutes = [0u64; 24];
            for s in sessions.iter().filter(in_range) {
                minutes[s.started_at.hour() as usize] += s.duration_min;
            }
            let buckets = minutes
                .iter()
                .enumerate()
                .map(|(hour, &m)| Bucket {
                    label: format!("{hour:02}"),
                    minutes: m,
                })
                .collect();
            (buckets, None)
        }
        TimeFrame::Week => {
            let mut minutes = [0u64; 7];
            for s in sessions.iter().filter(in_range) {
                minutes[s.started_at.weekday().num_days_from_sunday() as usize] += s.duration_min;
            }
            let buckets = minutes
                .iter()
                .zip(WEEKDAY_LABELS)
                .map(|(&m, label)| Bucket {
                    label: label.to_string(),
                    minutes: m,
                })
                .collect();
            (buckets, None)
        }
        TimeFrame::Month => (Vec::new(), Some(month_grid(sessions, start, end))),
        TimeFrame::Year => {
            let mut minutes = [0u64; 12];
            for s in sessions.iter().filter(in_range) {
                minutes[s.started_at.month0() as usize] += s.duration_min;
            }
            let buckets = minutes
                .iter()
                .zip(MONTH_LABELS)
                .map(|(&m, label)| Bucket {
                    label: label.to_string(),
                    minutes: m,
                })
                .collect();
            (buckets, None)
        }
    };

    ActivityReport {
        frame,
        range_start: start,
        range_end: end,
        total_minutes,
        hens_earned: total_minutes / MINUTES_PER_HEN,
        daily_average: if days == 0 {
            0.0
        } else {
            total_minutes as f64 / days as f64
        },
        buckets,
        grid,
    }
}

/// Week-aligned grid from the Sunday on or before the 1st through the
/// Saturday on or after the month's last day.
fn month_grid(sessions: &[StudySession], start: NaiveDate, end: NaiveDate) -> Vec<DayCell> {
    let grid_start = start - Duration::days(start.weekday().num_days_from_sunday() as i64);
    let last = end - Duration::days(1);
    let grid_end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);

    let mut cells = Vec::new();
    let mut date = grid_start;
    while date <= grid_end {
        let minutes = sessions
            .iter()
            .filter(|s| s.started_at.date_naive() == date)
            .map(|s| s.duration_min)
            .sum();
        cells.push(DayCell {
            date,
            minutes,
            in_current_month: date >= start && date < end,
        });
        date += Duration::days(1);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn session(y: i32, m: u32, d: u32, hour: u32, duration_min: u64) -> StudySession {
        let started_at = Utc.with_ymd_and_hms(y, m, d, hour, 15, 0).unwrap();
        StudySession {
            id: Uuid::new_v4(),
            duration_min,
            started_at,
            ended_at: started_at + Duration::minutes(duration_min as i64),
            leave_count: 0,
            task_name: None,
            category_id: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_view_buckets_by_hour() {
        let sessions = vec![
            session(2026, 8, 5, 9, 25),
            session(2026, 8, 5, 9, 30),
            session(2026, 8, 5, 21, 45),
            session(2026, 8, 4, 9, 60), // previous day, excluded
        ];
        let report = build_report(&sessions, TimeFrame::Day, day(2026, 8, 5));
        assert_eq!(report.buckets.len(), 24);
        assert_eq!(report.buckets[9].minutes, 55);
        assert_eq!(report.buckets[21].minutes, 45);
        assert_eq!(report.total_minutes, 100);
        assert_eq!(report.daily_average, 100.0);
    }

    #[test]
    fn week_view_buckets_by_weekday() {
        // Week of Sunday 2026-08-02.
        let sessions = vec![
            session(2026, 8, 2, 10, 30),  // Sunday
            session(2026, 8, 5, 10, 40),  // Wednesday
            session(2026, 8, 8, 10, 50),  // Saturday
            session(2026, 8, 9, 10, 999), // next Sunday, excluded
        ];
        let report = build_report(&sessions, TimeFrame::Week, day(2026, 8, 5));
        assert_eq!(report.buckets.len(), 7);
        assert_eq!(report.buckets[0].label, "Sun");
        assert_eq!(report.buckets[0].minutes, 30);
        assert_eq!(report.buckets[3].minutes, 40);
        assert_eq!(report.buckets[6].minutes, 50);
        assert_eq!(report.total_minutes, 120);
    }

    #[test]
    fn bucket_sums_match_range_total() {
        let sessions = vec![
            session(2026, 8, 1, 0, 10),
            session(2026, 8, 5, 9, 25),
            session(2026, 8, 5, 23, 35),
            session(2026, 8, 31, 12, 40),
            session(2026, 7, 31, 12, 50), // outside the month
        ];
        for frame in [TimeFrame::Day, TimeFrame::Week, TimeFrame::Year] {
            let report = build_report(&sessions, frame, day(2026, 8, 5));
            let bucket_sum: u64 = report.buckets.iter().map(|b| b.minutes).sum();
            assert_eq!(bucket_sum, report.total_minutes, "frame {frame:?}");
        }
        let report = build_report(&sessions, TimeFrame::Month, day(2026, 8, 5));
        let grid = report.grid.as_ref().unwrap();
        let in_month_sum: u64 = grid
            .iter()
            .filter(|c| c.in_current_month)
            .map(|c| c.minutes)
            .sum();
        assert_eq!(in_month_sum, report.total_minutes);
        assert_eq!(report.total_minutes, 110);
    }

    #[test]
    fn month_grid_is_week_aligned_with_padding() {
        // August 2026: the 1st is a Saturday, the 31st is a Monday.
        let report = build_report(&[], TimeFrame::Month, day(2026, 8, 5));
        let grid = report.grid.unwrap();
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid.first().unwrap().date, day(2026, 7, 26)); // Sunday before
        assert_eq!(grid.last().unwrap().date, day(2026, 9, 5)); // Saturday after
        assert!(!grid.first().unwrap().in_current_month);
        assert!(!grid.last().unwrap().in_current_month);
        assert_eq!(grid.iter().filter(|c| c.in_current_month).count(), 31);
    }

    #[test]
    fn grid_padding_cells_still_show_adjacent_month_minutes() {
        let sessions = vec![session(2026, 7, 31, 9, 45)];
        let report = build_report(&sessions, TimeFrame::Month, day(2026, 8, 5));
        let grid = report.grid.unwrap();
        let cell = grid.iter().find(|c| c.date == day(2026, 7, 31)).unwrap();
        assert_eq!(cell.minutes, 45);
        assert!(!cell.in_current_month);
        // Padding minutes never count toward the month total.
        assert_eq!(report.total_minutes, 0);
    }

    #[test]
    fn hens_projection_is_six_hour_quanta() {
        let sessions = vec![
            session(2026, 8, 3, 9, 360),
            session(2026, 8, 4, 9, 359),
        ];
        let report = build_report(&sessions, TimeFrame::Month, day(2026, 8, 5));
        assert_eq!(report.total_minutes, 719);
        assert_eq!(report.hens_earned, 1);
    }

    #[test]
    fn year_view_daily_average() {
        let sessions = vec![session(2026, 3, 10, 9, 730)];
        let report = build_report(&sessions, TimeFrame::Year, day(2026, 8, 5));
        assert_eq!(report.buckets[2].minutes, 730);
        assert_eq!(report.daily_average, 2.0);
    }
}
