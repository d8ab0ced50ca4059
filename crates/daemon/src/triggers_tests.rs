// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::bus::EventBus;
use conclave_core::{ChannelMessage, Event, FakeClock};
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;

fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

async fn dispatcher(dir: &tempfile::TempDir, body: &str) -> Arc<Dispatcher<FakeClock>> {
    let bin = write_script(dir, "agent", body);
    let pool = conclave_storage::open_in_memory().await.unwrap();
    Arc::new(Dispatcher::new(
        vec![AgentId::new("alice"), AgentId::new("bob")],
        FakeClock::new(),
        Duration::from_millis(60_000),
        pool,
        bin,
        EventBus::new(32),
    ))
}

#[tokio::test]
async fn a_mention_fires_a_trigger_for_the_mentioned_agent() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(&dir, "exit 0").await;
    let standup = StandupRunner::new(Arc::clone(&d));
    let mut events = d.bus().subscribe();

    let dispatchable = d.dispatchable_agents().to_vec();
    let message = ChannelMessage::new("general", "carol", "@bob can you look at this?", 1_000, &dispatchable);

    on_channel_message_posted(&d, &standup, &message).await;

    let event = events.recv().await.unwrap().event;
    assert!(matches!(event, Event::AgentTriggered { agent_id, .. } if agent_id == AgentId::new("bob")));
}

#[tokio::test]
async fn a_mention_is_silently_skipped_while_the_agent_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(&dir, "sleep 1; exit 0").await;
    let standup = StandupRunner::new(Arc::clone(&d));
    let mut events = d.bus().subscribe();

    d.trigger(&AgentId::new("bob"), PromptContext::new(TriggerReason::Dm, "poll", "x"), "hi".to_string()).await.unwrap();
    let _ = events.recv().await.unwrap(); // AgentTriggered from the direct dm trigger above

    let dispatchable = d.dispatchable_agents().to_vec();
    let message = ChannelMessage::new("general", "carol", "@bob are you there?", 1_000, &dispatchable);
    on_channel_message_posted(&d, &standup, &message).await;

    let result = tokio::time::timeout(Duration::from_millis(50), events.recv()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn manual_trigger_bypasses_cooldown_but_not_the_busy_check() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(&dir, "exit 0").await;

    d.trigger(&AgentId::new("alice"), PromptContext::new(TriggerReason::Dm, "poll", "x"), "hi".to_string()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = trigger_manual(&d, &AgentId::new("alice"), "do the thing", "operator").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn manual_trigger_still_rejects_an_active_agent() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(&dir, "sleep 1; exit 0").await;

    d.trigger(&AgentId::new("alice"), PromptContext::new(TriggerReason::Dm, "poll", "x"), "hi".to_string()).await.unwrap();

    let result = trigger_manual(&d, &AgentId::new("alice"), "do the thing", "operator").await;
    assert!(matches!(result, Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { .. }))));
}
