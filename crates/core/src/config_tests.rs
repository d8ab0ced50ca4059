// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_all() {
    for key in [
        "POLL_INTERVAL_MS",
        "COOLDOWN_MS",
        "DISPATCHER_ENABLED",
        "ASK_TIMEOUT_MS",
        "MAX_ASK_DEPTH",
        "MAX_ASK_CALLS_PER_SESSION",
        "COORD_DB_PATH",
        "COORD_CHANNEL_LOG_DIR",
        "COORD_AGENT_BIN",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_match_the_documented_table_when_unset() {
    clear_all();
    let config = Config::from_env();
    assert_eq!(config.poll_interval, Duration::from_millis(5_000));
    assert_eq!(config.cooldown, Duration::from_millis(60_000));
    assert!(config.dispatcher_enabled);
    assert_eq!(config.ask_timeout, Duration::from_millis(60_000));
    assert_eq!(config.max_ask_depth, 3);
    assert_eq!(config.max_ask_calls_per_session, 10);
    assert_eq!(config.db_path, "./coordination.sqlite3");
    assert_eq!(config.channel_log_dir, "./channels");
    assert_eq!(config.agent_bin, "agent");
}

#[test]
#[serial]
fn overrides_are_parsed_from_the_environment() {
    clear_all();
    std::env::set_var("COOLDOWN_MS", "1000");
    std::env::set_var("MAX_ASK_DEPTH", "5");
    std::env::set_var("DISPATCHER_ENABLED", "false");
    let config = Config::from_env();
    assert_eq!(config.cooldown, Duration::from_millis(1_000));
    assert_eq!(config.max_ask_depth, 5);
    assert!(!config.dispatcher_enabled);
    clear_all();
}

#[test]
#[serial]
fn an_unparseable_override_falls_back_to_the_default() {
    clear_all();
    std::env::set_var("MAX_ASK_DEPTH", "not-a-number");
    let config = Config::from_env();
    assert_eq!(config.max_ask_depth, 3);
    clear_all();
}
