// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry: one current session id per agent, lazily allocated.

use crate::error::StorageError;
use conclave_core::{AgentId, SessionId};
use sqlx::SqlitePool;
use tracing::instrument;

/// Return `agent`'s current session id, allocating and persisting a fresh
/// one on first call. Concurrent first-calls for the same agent race safely
/// to the same row via `INSERT OR IGNORE` followed by a read-back.
#[instrument(skip(pool), fields(agent = %agent))]
pub async fn get_session(pool: &SqlitePool, agent: &AgentId, now_ms: u64) -> Result<SessionId, StorageError> {
    let candidate = SessionId::new();
    sqlx::query("INSERT OR IGNORE INTO sessions (agent_id, session_id, created_at_ms) VALUES (?, ?, ?)")
        .bind(agent.as_str())
        .bind(candidate.as_str())
        .bind(now_ms as i64)
        .execute(pool)
        .await?;

    let row: (String,) = sqlx::query_as("SELECT session_id FROM sessions WHERE agent_id = ?")
        .bind(agent.as_str())
        .fetch_one(pool)
        .await?;

    Ok(SessionId::from_string(row.0))
}

/// Remove all session rows for `agent`.
#[instrument(skip(pool), fields(agent = %agent))]
pub async fn delete_sessions(pool: &SqlitePool, agent: &AgentId) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM sessions WHERE agent_id = ?")
        .bind(agent.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
