// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types.
//!
//! Two families exist here. "External" identifiers (agents, users, channels)
//! are opaque strings owned by a registry outside this crate's scope — we
//! only wrap them for type safety, we never generate them. "Internal"
//! identifiers (sessions, standup runs, orchestrator runs) are generated by
//! this crate via [`crate::define_id`] and use the `{prefix}{nanoid}` scheme.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier for an agent known to the coordination server.
///
/// Not every `AgentId` is dispatchable — dispatchability is a property
/// looked up from the agent registry (out of scope for this crate), so an
/// `AgentId` alone does not guarantee the agent can be spawned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier for a user taking part in DMs or channels.
///
/// `"team"` is a reserved value denoting a broadcast recipient rather than a
/// real user; see [`Message::is_broadcast`](crate::message::Message).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of a channel (append-only message stream shared by multiple agents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelName(pub String);

impl ChannelName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

crate::define_id! {
    /// Opaque session handle a subprocess uses to attach to its own
    /// persistent conversation state. Allocated once per agent by the
    /// session registry, never by the agent itself.
    pub struct SessionId("sess");
}

crate::define_id! {
    /// Per-call session id for a one-shot orchestrator invocation, distinct
    /// from per-agent session ids.
    pub struct OrchestratorSessionId("orch");
}

crate::define_id! {
    /// Identifies one run of the standup queue.
    pub struct StandupSessionId("stnd");
}

crate::define_id! {
    /// Identifies a DM/channel-broadcast message row.
    pub struct MessageId("msg_");
}

crate::define_id! {
    /// Identifies a single channel message (append-only log entry).
    pub struct ChannelMessageId("cmsg");
}
