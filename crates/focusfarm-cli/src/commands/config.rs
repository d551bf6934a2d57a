use clap::Subcommand;
use focusfarm_core::Config;

use crate::common;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as JSON
    Show,
    /// Get a value by dotted key (e.g. goals.daily_hours)
    Get { key: String },
    /// Set a value by dotted key
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            common::print_json(&config)?;
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let root = serde_json::to_value(&config)?;
            let value = get_json_path(&root, &key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            common::print_json(value)?;
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set_value(&key, &value)?;
            config.save()?;
            let root = serde_json::to_value(&config)?;
            if let Some(updated) = get_json_path(&root, &key) {
                common::print_json(updated)?;
            }
        }
    }
    Ok(())
}

fn get_json_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}
