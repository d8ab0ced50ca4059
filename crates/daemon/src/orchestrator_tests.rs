// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::bus::EventBus;
use conclave_core::{Event, FakeClock};
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

async fn runner(dir: &tempfile::TempDir, body: &str) -> OrchestratorRunner<FakeClock> {
    let bin = write_script(dir, "agent", body);
    let pool = conclave_storage::open_in_memory().await.unwrap();
    let dispatcher = Arc::new(Dispatcher::new(
        vec![AgentId::new("orchestrator")],
        FakeClock::new(),
        Duration::from_millis(60_000),
        pool,
        bin,
        EventBus::new(32),
    ));
    OrchestratorRunner::new(dispatcher)
}

#[tokio::test]
async fn a_successful_run_frees_the_slot_and_emits_orchestrator_ended() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(&dir, "exit 0").await;
    let mut events = r.dispatcher.bus().subscribe();

    r.trigger("status", "{}", Some("ops".to_string())).await.unwrap();
    assert!(r.is_occupied());
    assert!(matches!(events.recv().await.unwrap().event, Event::OrchestratorStarted { .. }));
    assert!(matches!(events.recv().await.unwrap().event, Event::OrchestratorEnded { exit_code: Some(0), .. }));
    assert!(!r.is_occupied());
}

#[tokio::test]
async fn a_nonzero_exit_emits_orchestrator_failed_and_frees_the_slot() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(&dir, "exit 7").await;
    let mut events = r.dispatcher.bus().subscribe();

    r.trigger("decompose", "{}", None).await.unwrap();
    let _ = events.recv().await.unwrap(); // OrchestratorStarted
    assert!(matches!(events.recv().await.unwrap().event, Event::OrchestratorFailed { .. }));
    assert!(!r.is_occupied());
}

#[tokio::test]
async fn a_second_trigger_while_occupied_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let r = runner(&dir, "sleep 1; exit 0").await;

    r.trigger("status", "{}", None).await.unwrap();
    let second = r.trigger("status", "{}", None).await;
    assert!(matches!(second, Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { .. }))));
}
