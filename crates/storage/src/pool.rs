// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool setup and schema migration.

use crate::error::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Open (creating if absent) the coordination SQLite database at `path` and
/// run migrations. A single connection is kept in the pool: writers are
/// serialized through it, matching the spec's single-writer WAL model.
pub async fn open(path: impl AsRef<Path>) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.as_ref().display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Open an in-memory database, for tests.
pub async fn open_in_memory() -> Result<SqlitePool, StorageError> {
    let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            agent_id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            created_at_ms INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            from_id TEXT NOT NULL,
            to_id TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS message_reads (
            message_id TEXT NOT NULL,
            agent_id TEXT NOT NULL,
            PRIMARY KEY (message_id, agent_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_to ON messages(to_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channel_messages (
            id TEXT PRIMARY KEY,
            channel TEXT NOT NULL,
            from_id TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL,
            mentions_json TEXT NOT NULL,
            thread_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_channel_messages_channel ON channel_messages(channel)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channel_message_reads (
            message_id TEXT NOT NULL,
            agent_id TEXT NOT NULL,
            PRIMARY KEY (message_id, agent_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS standup_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            agent_id TEXT NOT NULL,
            session_id TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
