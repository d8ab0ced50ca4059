// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ids::SessionId;

#[test]
fn envelope_serializes_as_a_flat_type_data_timestamp_frame() {
    let event = Event::AgentTriggered {
        agent_id: AgentId::new("alice"),
        session_id: SessionId::new(),
        resumed: None,
    };
    let envelope = EventEnvelope::new(event, 42);
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["type"], "agent_triggered");
    assert_eq!(json["timestamp_ms"], 42);
    assert_eq!(json["data"]["agent_id"], "alice");
}

#[test]
fn dispatcher_status_round_trips() {
    let envelope = EventEnvelope::new(Event::DispatcherStatus { enabled: true }, 7);
    let json = serde_json::to_string(&envelope).unwrap();
    let back: EventEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back, envelope);
}

#[test]
fn agent_conversation_tags_its_status() {
    let event = Event::AgentConversation {
        caller: AgentId::new("alice"),
        callee: AgentId::new("bob"),
        depth: 1,
        status: AskAgentStatus::Started,
        preview: Some("hi".to_string()),
    };
    let json = serde_json::to_value(EventEnvelope::new(event, 0)).unwrap();
    assert_eq!(json["type"], "agent_conversation");
    assert_eq!(json["data"]["status"], "started");
}
