// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("channel log io error: {0}")]
    ChannelLogIo(#[from] std::io::Error),

    #[error("channel log entry corrupt: {0}")]
    ChannelLogCorrupt(String),
}

impl From<StorageError> for conclave_core::DispatchFailure {
    fn from(err: StorageError) -> Self {
        conclave_core::DispatchFailure::StorageFailure(err.to_string())
    }
}
