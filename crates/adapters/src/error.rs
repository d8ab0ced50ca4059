// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess adapter errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to spawn subprocess: {0}")]
    ExecFailed(std::io::Error),

    #[error("subprocess exited with code {exit_code:?}, stderr: {stderr}")]
    NonZeroExit { exit_code: Option<i32>, stderr: String },

    #[error("subprocess timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<SpawnError> for conclave_core::DispatchFailure {
    fn from(err: SpawnError) -> Self {
        match err {
            SpawnError::ExecFailed(e) => conclave_core::DispatchFailure::TransientSubprocess(e.to_string()),
            SpawnError::NonZeroExit { stderr, .. } => conclave_core::DispatchFailure::TransientSubprocess(stderr),
            SpawnError::Timeout(d) => conclave_core::DispatchFailure::Timeout(d),
        }
    }
}
