// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel message log: JSONL durable log mirrored into a SQLite projection.
//!
//! SQLite is the source of truth queried by `unreadFor`/`getUnreadChannelMessages`;
//! the JSONL file under `COORD_CHANNEL_LOG_DIR` is an append-only mirror kept
//! for external tailing. `append_channel_message` writes SQLite first inside
//! a transaction, then best-effort appends the JSONL line — a crash between
//! the two loses only the mirror.

use crate::error::StorageError;
use conclave_core::{AgentId, ChannelMessage, ChannelMessageId};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

fn channel_log_path(log_dir: &Path, channel: &str) -> PathBuf {
    log_dir.join(format!("{channel}.jsonl"))
}

/// Append a message to `channel`, parsing `@mentions` against `dispatchable`.
/// Returns the stored [`ChannelMessage`] including its parsed mentions.
#[instrument(skip(pool, content, dispatchable), fields(channel = %channel))]
pub async fn append_channel_message(
    pool: &SqlitePool,
    log_dir: &Path,
    channel: &str,
    from: &str,
    content: &str,
    timestamp_ms: u64,
    dispatchable: &[AgentId],
) -> Result<ChannelMessage, StorageError> {
    let message = ChannelMessage::new(channel, from, content, timestamp_ms, dispatchable);

    let mentions_json = serde_json::to_string(&message.mentions).unwrap_or_else(|_| "[]".to_string());
    sqlx::query(
        r#"
        INSERT INTO channel_messages (id, channel, from_id, content, timestamp_ms, mentions_json, thread_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id.as_str())
    .bind(&message.channel)
    .bind(&message.from)
    .bind(&message.content)
    .bind(message.timestamp_ms as i64)
    .bind(&mentions_json)
    .bind(&message.thread_id)
    .execute(pool)
    .await?;

    if let Err(err) = append_jsonl(log_dir, channel, &message).await {
        tracing::error!(channel, error = %err, "channel log jsonl mirror write failed");
    }

    Ok(message)
}

async fn append_jsonl(log_dir: &Path, channel: &str, message: &ChannelMessage) -> std::io::Result<()> {
    tokio::fs::create_dir_all(log_dir).await?;
    let path = channel_log_path(log_dir, channel);
    let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
    let mut line = serde_json::to_string(message).expect("ChannelMessage always serializes");
    line.push('\n');
    file.write_all(line.as_bytes()).await
}

/// Read up to `limit` most recent messages from `channel`, oldest first.
#[instrument(skip(pool), fields(channel = %channel))]
pub async fn read_channel_messages(
    pool: &SqlitePool,
    channel: &str,
    limit: i64,
) -> Result<Vec<ChannelMessage>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM (
            SELECT id, channel, from_id, content, timestamp_ms, mentions_json, thread_id
            FROM channel_messages WHERE channel = ?
            ORDER BY timestamp_ms DESC, id DESC LIMIT ?
        ) ORDER BY timestamp_ms ASC, id ASC
        "#,
    )
    .bind(channel)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_channel_message).collect()
}

/// Messages in `channel` not yet marked read for `agent`.
#[instrument(skip(pool), fields(channel = %channel, agent = %agent))]
pub async fn get_unread_channel_messages(
    pool: &SqlitePool,
    channel: &str,
    agent: &AgentId,
) -> Result<Vec<ChannelMessage>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT id, channel, from_id, content, timestamp_ms, mentions_json, thread_id
        FROM channel_messages m
        WHERE m.channel = ?
          AND NOT EXISTS (
            SELECT 1 FROM channel_message_reads r WHERE r.message_id = m.id AND r.agent_id = ?
          )
        ORDER BY timestamp_ms ASC, id ASC
        "#,
    )
    .bind(channel)
    .bind(agent.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_channel_message).collect()
}

/// Mark every message in `channel` with `timestamp_ms <= up_to_ms` read for `agent`.
#[instrument(skip(pool), fields(channel = %channel, agent = %agent))]
pub async fn mark_channel_read(
    pool: &SqlitePool,
    channel: &str,
    agent: &AgentId,
    up_to_ms: u64,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO channel_message_reads (message_id, agent_id)
        SELECT id, ? FROM channel_messages WHERE channel = ? AND timestamp_ms <= ?
        "#,
    )
    .bind(agent.as_str())
    .bind(channel)
    .bind(up_to_ms as i64)
    .execute(pool)
    .await?;
    Ok(())
}

fn row_to_channel_message(row: sqlx::sqlite::SqliteRow) -> Result<ChannelMessage, StorageError> {
    let mentions_json: String = row.get("mentions_json");
    let mentions: Vec<AgentId> = serde_json::from_str(&mentions_json)
        .map_err(|e| StorageError::ChannelLogCorrupt(format!("mentions_json: {e}")))?;

    Ok(ChannelMessage {
        id: ChannelMessageId::from_string(row.get::<String, _>("id")),
        channel: row.get("channel"),
        from: row.get("from_id"),
        content: row.get("content"),
        timestamp_ms: row.get::<i64, _>("timestamp_ms") as u64,
        mentions,
        thread_id: row.get("thread_id"),
    })
}

#[cfg(test)]
#[path = "channel_log_tests.rs"]
mod tests;
