use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use focusfarm_core::analytics::{frame_range, minutes_in_range, TimeFrame};
use focusfarm_core::ledger::{monthly_claim_key, weekly_claim_key, HENS_PER_COW, HENS_PER_GOAT};
use focusfarm_core::remote::{ProgressPatch, WriteIntent};
use focusfarm_core::{Animal, ClaimOutcome, Config, Database, Event, GoalPeriod};

use crate::common;

#[derive(Clone, Copy, ValueEnum)]
pub enum ClaimPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConvertTarget {
    Goat,
    Cow,
}

#[derive(Subcommand)]
pub enum FarmAction {
    /// Show the farm inventory and today's progress
    Show,
    /// Claim a goal reward
    Claim {
        #[arg(value_enum)]
        period: ClaimPeriod,
    },
    /// Convert hens into a bigger animal (6 per goat, 24 per cow)
    Convert {
        #[arg(value_enum)]
        target: ConvertTarget,
    },
}

pub fn run(action: FarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let mut counters = common::load_counters(&db, &config);

    match action {
        FarmAction::Show => {
            common::print_json(&serde_json::json!({
                "hens": counters.hens,
                "goats": counters.goats,
                "cows": counters.cows,
                "total_animals": counters.total_animals(),
                "today_minutes": counters.today_minutes,
                "daily_goal_claimed": counters.daily_goal_claimed,
                "daily_goal_hours": counters.daily_goal_hours,
            }))?;
        }
        FarmAction::Claim { period } => {
            let today = Utc::now().date_naive();
            let outcome = match period {
                ClaimPeriod::Daily => counters.claim_daily(),
                ClaimPeriod::Weekly => {
                    let (start, end) = frame_range(TimeFrame::Week, today);
                    let sessions = db.sessions_since(14)?;
                    let minutes = minutes_in_range(&sessions, start, end);
                    let marker = weekly_claim_key(today);
                    let already = db.kv_get(&marker)?.is_some();
                    let outcome = counters.claim_weekly(minutes, already);
                    if outcome.granted() {
                        db.kv_set(&marker, "1")?;
                    }
                    outcome
                }
                ClaimPeriod::Monthly => {
                    let (start, end) = frame_range(TimeFrame::Month, today);
                    let sessions = db.sessions_since(62)?;
                    let minutes = minutes_in_range(&sessions, start, end);
                    let marker = monthly_claim_key(today);
                    let already = db.kv_get(&marker)?.is_some();
                    let outcome = counters.claim_monthly(minutes, already);
                    if outcome.granted() {
                        db.kv_set(&marker, "1")?;
                    }
                    outcome
                }
            };

            if let ClaimOutcome::Granted { animal } = outcome {
                common::save_counters(&db, &counters)?;
                let _ = common::push_writes(
                    &config,
                    vec![WriteIntent::UpdateProgress(ProgressPatch::from_counters(
                        &counters,
                    ))],
                    false,
                );
                let goal_period = match period {
                    ClaimPeriod::Daily => GoalPeriod::Daily,
                    ClaimPeriod::Weekly => GoalPeriod::Weekly,
                    ClaimPeriod::Monthly => GoalPeriod::Monthly,
                };
                common::print_json(&Event::RewardClaimed {
                    period: goal_period,
                    animal,
                    at: Utc::now(),
                })?;
            } else {
                common::print_json(&outcome)?;
            }
        }
        FarmAction::Convert { target } => {
            let converted = match target {
                ConvertTarget::Goat => counters.convert_hens_to_goat(),
                ConvertTarget::Cow => counters.convert_hens_to_cow(),
            };
            if converted {
                common::save_counters(&db, &counters)?;
                let _ = common::push_writes(
                    &config,
                    vec![WriteIntent::UpdateProgress(ProgressPatch::animals(&counters))],
                    false,
                );
                let (hens_spent, animal) = match target {
                    ConvertTarget::Goat => (HENS_PER_GOAT, Animal::Goat),
                    ConvertTarget::Cow => (HENS_PER_COW, Animal::Cow),
                };
                common::print_json(&Event::AnimalsConverted {
                    hens_spent,
                    animal,
                    at: Utc::now(),
                })?;
            } else {
                common::print_json(&serde_json::json!({
                    "converted": false,
                    "hens": counters.hens,
                }))?;
            }
        }
    }
    Ok(())
}
