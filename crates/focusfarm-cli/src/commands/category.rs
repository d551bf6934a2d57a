use clap::Subcommand;
use focusfarm_core::remote::WriteIntent;
use focusfarm_core::{Category, Config, Database, ValidationError};
use uuid::Uuid;

use crate::common;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List,
    /// Create a category
    Add {
        name: String,
        /// Display color, e.g. "#22c55e"
        #[arg(long, default_value = "")]
        color: String,
        /// Display icon name
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Delete a category. Historical sessions keep the dangling id.
    Remove { id: Uuid },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;

    match action {
        CategoryAction::List => {
            let categories = db.list_categories()?;
            common::print_json(&categories)?;
        }
        CategoryAction::Add { name, color, icon } => {
            if name.trim().is_empty() {
                return Err(ValidationError::Empty("name".into()).into());
            }
            let category = Category {
                id: Uuid::new_v4(),
                name: name.trim().to_string(),
                color,
                icon,
            };
            db.upsert_category(&category)?;
            // User-initiated: a failed remote write is surfaced.
            common::push_writes(
                &config,
                vec![WriteIntent::InsertCategory(category.clone())],
                true,
            )?;
            common::print_json(&category)?;
        }
        CategoryAction::Remove { id } => {
            let deleted = db.delete_category(id)?;
            common::push_writes(&config, vec![WriteIntent::DeleteCategory(id)], true)?;
            common::print_json(&serde_json::json!({ "deleted": deleted }))?;
        }
    }
    Ok(())
}
