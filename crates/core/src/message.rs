// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct/broadcast message model.

use crate::ids::{AgentId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Recipient value meaning "every dispatchable agent", used in [`Message::to`].
pub const BROADCAST: &str = "team";

/// A direct or broadcast message between a user/agent and an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: UserId,
    /// Recipient agent id, or [`BROADCAST`] ("team") for a broadcast message.
    pub to: String,
    pub content: String,
    pub timestamp_ms: u64,
    pub read_by: HashSet<AgentId>,
}

impl Message {
    pub fn new(from: impl Into<UserId>, to: impl Into<String>, content: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            id: MessageId::new(),
            from: from.into(),
            to: to.into(),
            content: content.into(),
            timestamp_ms,
            read_by: HashSet::new(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST
    }

    /// A message is addressed to `agent` if it is a direct DM to them or a
    /// broadcast; "unread" additionally requires `agent` not be in `read_by`.
    pub fn is_addressed_to(&self, agent: &AgentId) -> bool {
        self.is_broadcast() || self.to == agent.as_str()
    }

    pub fn is_unread_for(&self, agent: &AgentId) -> bool {
        self.is_addressed_to(agent) && !self.read_by.contains(agent)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
