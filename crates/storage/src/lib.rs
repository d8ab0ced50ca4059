// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! conclave-storage: the SQLite-backed message/channel/session store.
//!
//! SQLite is the source of truth for everything queryable (`unreadFor`,
//! `getUnreadChannelMessages`); the channel JSONL log is a best-effort
//! durability mirror kept alongside it, not the other way around.

pub mod channel_log;
pub mod error;
pub mod messages;
pub mod pool;
pub mod sessions;

pub use channel_log::{append_channel_message, get_unread_channel_messages, mark_channel_read, read_channel_messages};
pub use error::StorageError;
pub use messages::{insert_message, mark_read, post_standup, unread_for};
pub use pool::{open, open_in_memory};
pub use sessions::{delete_sessions, get_session};
