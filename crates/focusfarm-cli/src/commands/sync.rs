use chrono::Utc;
use clap::Subcommand;
use focusfarm_core::remote::{ProgressPatch, ProgressStore, WriteIntent};
use focusfarm_core::storage::token_store;
use focusfarm_core::{Config, Database};

use crate::common;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Store credentials for the progress store
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        token: String,
    },
    /// Remove stored credentials
    Logout,
    /// Fetch remote progress, sessions, and categories into the local cache
    Pull,
    /// Push the local counters to the progress store
    Push,
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SyncAction::Login { user_id, token } => {
            token_store::set(&token)?;
            let mut config = Config::load()?;
            config.backend.user_id = Some(user_id);
            config.save()?;
            common::print_json(&serde_json::json!({ "signed_in": true }))?;
        }
        SyncAction::Logout => {
            token_store::delete()?;
            let mut config = Config::load()?;
            config.backend.user_id = None;
            config.save()?;
            common::print_json(&serde_json::json!({ "signed_in": false }))?;
        }
        SyncAction::Pull => {
            let mut db = Database::open()?;
            let config = Config::load()?;
            let store = common::build_store(&config)?;
            if !store.is_authenticated() {
                return Err("not signed in; run `sync login` first".into());
            }

            let runtime = tokio::runtime::Runtime::new()?;
            let (progress, sessions, categories) = runtime.block_on(async {
                let progress = store.get_progress().await?;
                let sessions = store.list_sessions(365).await?;
                let categories = store.list_categories().await?;
                Ok::<_, focusfarm_core::StoreError>((progress, sessions, categories))
            })?;

            if let Some(mut counters) = progress {
                counters.roll_day(Utc::now().date_naive());
                common::save_counters(&db, &counters)?;
            }
            db.replace_sessions(&sessions)?;
            for category in &categories {
                db.upsert_category(category)?;
            }

            common::print_json(&serde_json::json!({
                "sessions": sessions.len(),
                "categories": categories.len(),
            }))?;
        }
        SyncAction::Push => {
            let db = Database::open()?;
            let config = Config::load()?;
            if common::auth_context(&config).is_none() {
                return Err("not signed in; run `sync login` first".into());
            }
            let counters = common::load_counters(&db, &config);
            common::push_writes(
                &config,
                vec![WriteIntent::UpdateProgress(ProgressPatch::from_counters(
                    &counters,
                ))],
                true,
            )?;
            common::print_json(&serde_json::json!({ "pushed": true }))?;
        }
    }
    Ok(())
}
