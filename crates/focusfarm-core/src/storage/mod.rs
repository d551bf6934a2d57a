mod config;
pub mod database;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/focusfarm[-dev]/` based on FOCUSFARM_ENV.
///
/// Set FOCUSFARM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSFARM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusfarm-dev")
    } else {
        base_dir.join("focusfarm")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Thin wrapper around the OS keyring for the backend access token.
pub mod token_store {
    const SERVICE: &str = "focusfarm";
    const TOKEN_KEY: &str = "backend-token";

    pub fn get() -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(token: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        entry.set_password(token)
    }

    pub fn delete() -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
