// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error classification.
//!
//! [`DispatchFailure`] is the closed set of ways a dispatch-level operation
//! (trigger, ask_agent, standup/orchestrator advance) can fail. Storage and
//! subprocess-adapter crates define their own `thiserror` enums for their own
//! concerns and convert into this one at the daemon boundary, rather than
//! this crate depending on `sqlx` or `tokio::process` directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchFailure {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("agent {agent} is not idle, cannot trigger")]
    ConcurrencyConflict { agent: String },

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("transient subprocess failure: {0}")]
    TransientSubprocess(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to broadcast event: {0}")]
    BroadcastFailure(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl DispatchFailure {
    /// Whether retrying the same operation immediately is sound. Transient
    /// subprocess failures and broadcast-buffer-full conditions are; policy
    /// and concurrency conflicts are not (retrying without a state change
    /// would just fail the same way).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientSubprocess(_) | Self::BroadcastFailure(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
