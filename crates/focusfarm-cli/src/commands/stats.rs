use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use focusfarm_core::analytics::{build_report, TimeFrame};
use focusfarm_core::Database;

use crate::common;

/// How many days of cached history feed the dashboard.
const HISTORY_DAYS: u32 = 365;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Hourly buckets for one day
    Day {
        /// Reference date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Weekday buckets for the week containing the date
    Week {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Calendar grid for the month containing the date
    Month {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Monthly buckets for the year containing the date
    Year {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (frame, date) = match action {
        StatsAction::Day { date } => (TimeFrame::Day, date),
        StatsAction::Week { date } => (TimeFrame::Week, date),
        StatsAction::Month { date } => (TimeFrame::Month, date),
        StatsAction::Year { date } => (TimeFrame::Year, date),
    };
    let reference = date.unwrap_or_else(|| Utc::now().date_naive());

    let db = Database::open()?;
    let sessions = db.sessions_since(HISTORY_DAYS)?;
    let report = build_report(&sessions, frame, reference);
    common::print_json(&report)
}
