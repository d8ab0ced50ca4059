// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of events the daemon emits on its broadcast bus.
//!
//! Every event carries an envelope with a wall-clock timestamp; the payload
//! itself is the tagged `Event` enum, serialized with `#[serde(tag = "type",
//! content = "data")]` so WebSocket consumers outside this crate get a flat
//! `{type, data, timestamp}` frame.

use crate::ids::{AgentId, OrchestratorSessionId, SessionId, StandupSessionId};
use serde::{Deserialize, Serialize};

/// `status` field of [`Event::AgentConversation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AskAgentStatus {
    Started,
    Completed,
}

/// The closed tag set emitted on the event bus, matching the wire contract:
/// `agent_triggered`, `agent_session_ended`, `agent_trigger_failed`,
/// `session_refreshed`, `standup_session_start`, `standup_agent_complete`,
/// `standup_session_complete`, `orchestrator_started`, `orchestrator_ended`,
/// `orchestrator_failed`, `agent_conversation`, `dispatcher_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    AgentTriggered {
        agent_id: AgentId,
        session_id: SessionId,
        /// `None` when emitted at spawn time, before the resume/create
        /// fallback has resolved; filled in once it has.
        resumed: Option<bool>,
    },
    AgentSessionEnded {
        agent_id: AgentId,
        session_id: SessionId,
        exit_code: Option<i32>,
    },
    AgentTriggerFailed {
        agent_id: AgentId,
        reason: String,
    },
    SessionRefreshed {
        agent_id: AgentId,
        session_id: SessionId,
    },
    StandupSessionStart {
        session_id: StandupSessionId,
        channel: String,
        order: Vec<AgentId>,
    },
    StandupAgentComplete {
        session_id: StandupSessionId,
        agent_id: AgentId,
    },
    StandupSessionComplete {
        session_id: StandupSessionId,
        completed_agents: Vec<AgentId>,
    },
    OrchestratorStarted {
        session_id: OrchestratorSessionId,
        command: String,
    },
    OrchestratorEnded {
        session_id: OrchestratorSessionId,
        exit_code: Option<i32>,
    },
    OrchestratorFailed {
        session_id: OrchestratorSessionId,
        reason: String,
    },
    AgentConversation {
        caller: AgentId,
        callee: AgentId,
        depth: u8,
        status: AskAgentStatus,
        preview: Option<String>,
    },
    DispatcherStatus {
        enabled: bool,
    },
}

/// Wire envelope around an [`Event`]. The `timestamp` is epoch milliseconds
/// from the daemon's [`crate::clock::Clock`], not the system clock directly,
/// so tests can assert on it deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub event: Event,
    pub timestamp_ms: u64,
}

impl EventEnvelope {
    pub fn new(event: Event, timestamp_ms: u64) -> Self {
        Self { event, timestamp_ms }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
