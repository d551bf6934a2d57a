//! Config file persistence against an isolated home directory.
//!
//! Kept as a single test: it rewires HOME for the whole process, which must
//! not race with anything else.

use focusfarm_core::Config;

#[test]
fn save_then_load_round_trips_and_tolerates_absence() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_var("FOCUSFARM_ENV", "dev");

    // No file yet: defaults.
    let config = Config::load().unwrap();
    assert_eq!(config.goals.daily_hours, 6.0);

    let mut config = Config::default();
    config.display_name = Some("Sam".into());
    config.ui.dark_mode = false;
    config.goals.weekly_hours = 20.0;
    config.save().unwrap();

    let path = Config::path().unwrap();
    assert!(path.exists());
    assert!(path.to_string_lossy().contains("focusfarm-dev"));

    let loaded = Config::load().unwrap();
    assert_eq!(loaded.display_name.as_deref(), Some("Sam"));
    assert!(!loaded.ui.dark_mode);
    assert_eq!(loaded.goals.weekly_hours, 20.0);

    // A second save overwrites atomically; no temp file left behind.
    config.goals.weekly_hours = 25.0;
    config.save().unwrap();
    assert!(!path.with_extension("toml.tmp").exists());
    assert_eq!(Config::load().unwrap().goals.weekly_hours, 25.0);
}
