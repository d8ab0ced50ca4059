// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration, loaded once at startup from the environment.

use std::time::Duration;

/// Knobs read once at startup; see each field for its env var and default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `POLL_INTERVAL_MS`, default 5000.
    pub poll_interval: Duration,
    /// `COOLDOWN_MS`, default 60000.
    pub cooldown: Duration,
    /// `DISPATCHER_ENABLED`, default true.
    pub dispatcher_enabled: bool,
    /// `ASK_TIMEOUT_MS`, default 60000.
    pub ask_timeout: Duration,
    /// `MAX_ASK_DEPTH`, default 3.
    pub max_ask_depth: u8,
    /// `MAX_ASK_CALLS_PER_SESSION`, default 10.
    pub max_ask_calls_per_session: u32,
    /// `COORD_DB_PATH`, default "./coordination.sqlite3".
    pub db_path: String,
    /// `COORD_CHANNEL_LOG_DIR`, default "./channels".
    pub channel_log_dir: String,
    /// `COORD_AGENT_BIN`, default "agent".
    pub agent_bin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            poll_interval: env_duration_ms("POLL_INTERVAL_MS", 5_000),
            cooldown: env_duration_ms("COOLDOWN_MS", 60_000),
            dispatcher_enabled: env_bool("DISPATCHER_ENABLED", true),
            ask_timeout: env_duration_ms("ASK_TIMEOUT_MS", 60_000),
            max_ask_depth: env_parsed("MAX_ASK_DEPTH", 3),
            max_ask_calls_per_session: env_parsed("MAX_ASK_CALLS_PER_SESSION", 10),
            db_path: env_string("COORD_DB_PATH", "./coordination.sqlite3"),
            channel_log_dir: env_string("COORD_CHANNEL_LOG_DIR", "./channels"),
            agent_bin: env_string("COORD_AGENT_BIN", "agent"),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_parsed(key, default_ms))
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| !matches!(s.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
