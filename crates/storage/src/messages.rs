// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct/broadcast message store: unread queries, read-marking, posting.

use crate::error::StorageError;
use conclave_core::{AgentId, Message, MessageId, UserId, BROADCAST};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

/// `unreadFor(agent) -> (count, [Message])`. A message is unread for `agent`
/// if it is addressed to them (direct or broadcast) and no row exists in
/// `message_reads` for `(message.id, agent)`.
#[instrument(skip(pool), fields(agent = %agent))]
pub async fn unread_for(pool: &SqlitePool, agent: &AgentId) -> Result<(usize, Vec<Message>), StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT m.id, m.from_id, m.to_id, m.content, m.timestamp_ms
        FROM messages m
        WHERE (m.to_id = ? OR m.to_id = ?)
          AND NOT EXISTS (
            SELECT 1 FROM message_reads r WHERE r.message_id = m.id AND r.agent_id = ?
          )
        ORDER BY m.timestamp_ms ASC, m.id ASC
        "#,
    )
    .bind(agent.as_str())
    .bind(BROADCAST)
    .bind(agent.as_str())
    .fetch_all(pool)
    .await?;

    let messages: Vec<Message> = rows
        .into_iter()
        .map(|row| Message {
            id: MessageId::from_string(row.get::<String, _>("id")),
            from: UserId::new(row.get::<String, _>("from_id")),
            to: row.get("to_id"),
            content: row.get("content"),
            timestamp_ms: row.get::<i64, _>("timestamp_ms") as u64,
            read_by: Default::default(),
        })
        .collect();

    Ok((messages.len(), messages))
}

/// Insert a new message. Exposed for trigger sinks and tests that need to
/// seed the store; production posting of DMs is out of this crate's scope
/// (owned by the external user/channel CRUD layer per the spec).
#[instrument(skip(pool, content))]
pub async fn insert_message(
    pool: &SqlitePool,
    from: &UserId,
    to: &str,
    content: &str,
    timestamp_ms: u64,
) -> Result<Message, StorageError> {
    let message = Message::new(from.clone(), to, content, timestamp_ms);
    sqlx::query("INSERT INTO messages (id, from_id, to_id, content, timestamp_ms) VALUES (?, ?, ?, ?, ?)")
        .bind(message.id.as_str())
        .bind(message.from.as_str())
        .bind(&message.to)
        .bind(&message.content)
        .bind(message.timestamp_ms as i64)
        .execute(pool)
        .await?;
    Ok(message)
}

/// Mark a single message read for `agent`. Idempotent.
#[instrument(skip(pool), fields(agent = %agent))]
pub async fn mark_read(pool: &SqlitePool, message_id: &MessageId, agent: &AgentId) -> Result<(), StorageError> {
    sqlx::query("INSERT OR IGNORE INTO message_reads (message_id, agent_id) VALUES (?, ?)")
        .bind(message_id.as_str())
        .bind(agent.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist a standup post for history, per `postStandup(agent, content, sessionId)`.
#[instrument(skip(pool, content), fields(agent = %agent))]
pub async fn post_standup(
    pool: &SqlitePool,
    agent: &AgentId,
    session_id: &str,
    content: &str,
    timestamp_ms: u64,
) -> Result<(), StorageError> {
    sqlx::query("INSERT INTO standup_history (agent_id, session_id, content, timestamp_ms) VALUES (?, ?, ?, ?)")
        .bind(agent.as_str())
        .bind(session_id)
        .bind(content)
        .bind(timestamp_ms as i64)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
