// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate error type for the daemon's RPC-facing operations
//! (`trigger`, `ask_agent`, `refresh_agent_session`, `start_standup`,
//! `trigger_orchestrator`): each wraps a subsystem's own error type rather
//! than flattening into strings, so callers can still match on source.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Dispatch(#[from] conclave_core::DispatchFailure),

    #[error(transparent)]
    Storage(#[from] conclave_storage::StorageError),

    #[error(transparent)]
    Spawn(#[from] conclave_adapters::SpawnError),
}

impl DispatchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Dispatch(e) => e.is_retryable(),
            Self::Storage(_) => false,
            Self::Spawn(e) => matches!(e, conclave_adapters::SpawnError::ExecFailed(_)),
        }
    }
}
