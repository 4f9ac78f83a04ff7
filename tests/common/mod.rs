use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use tally::{Config, ConfigManager, Tally};
use tally_core::FixedClock;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated config manager whose config points at a fresh data directory.
pub fn setup_test_env() -> ConfigManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let manager = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    let config = Config {
        data_dir: Some(base.join("data")),
        card_ledger_category: Some(Uuid::new_v4()),
        ..Config::default()
    };
    manager.save(&config).expect("save test config");
    manager
}

/// Opens the data set described by `manager` with a pinned clock.
pub fn open_pinned(manager: &ConfigManager) -> Tally {
    let config = manager.load().expect("load test config");
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 2, 3, 12, 0, 0).unwrap()));
    Tally::open_with_clock(config, clock).expect("open tally")
}
