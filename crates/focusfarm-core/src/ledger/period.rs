//! Claim-marker keys for weekly and monthly rewards.
//!
//! Markers live in the local kv table, one key per `(year, period_number)`.
//! The weekly period number is `floor(day_of_month / 7)` - NOT ISO week
//! numbering - so keys can alias across month boundaries. This matches the
//! claim scoping the product has always used; changing it to ISO weeks would
//! shift claim-eligibility timing.

use chrono::{Datelike, NaiveDate};

pub fn weekly_claim_key(date: NaiveDate) -> String {
    format!("claim:weekly:{}-{}", date.year(), date.day() / 7)
}

pub fn monthly_claim_key(date: NaiveDate) -> String {
    format!("claim:monthly:{}-{}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_key_buckets_by_seven_days() {
        assert_eq!(weekly_claim_key(day(2026, 8, 1)), "claim:weekly:2026-0");
        assert_eq!(weekly_claim_key(day(2026, 8, 6)), "claim:weekly:2026-0");
        assert_eq!(weekly_claim_key(day(2026, 8, 7)), "claim:weekly:2026-1");
        assert_eq!(weekly_claim_key(day(2026, 8, 28)), "claim:weekly:2026-4");
    }

    #[test]
    fn weekly_key_ignores_month() {
        // Same period number in different months maps to the same key.
        assert_eq!(
            weekly_claim_key(day(2026, 8, 10)),
            weekly_claim_key(day(2026, 9, 10))
        );
    }

    #[test]
    fn monthly_key_is_year_month() {
        assert_eq!(monthly_claim_key(day(2026, 8, 15)), "claim:monthly:2026-8");
        assert_ne!(
            monthly_claim_key(day(2026, 8, 15)),
            monthly_claim_key(day(2025, 8, 15))
        );
    }
}
