// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;

fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn resume_succeeds_without_a_create_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(&dir, "agent", "echo ok; exit 0");

    let (output, resumed) = spawn_with_resume_fallback(&bin, &AgentId::new("alice"), "sess1", "hi", &[]).await.unwrap();
    assert!(resumed);
    assert!(output.is_success());
    assert_eq!(output.stdout.trim(), "ok");
}

#[tokio::test]
async fn a_non_sentinel_failure_does_not_retry_with_create() {
    let dir = tempfile::tempdir().unwrap();
    let counter = dir.path().join("calls");
    let bin = write_script(
        &dir,
        "agent",
        &format!("echo x >> {} ; echo other failure 1>&2 ; exit 1", counter.display()),
    );

    let (output, resumed) = spawn_with_resume_fallback(&bin, &AgentId::new("alice"), "sess1", "hi", &[]).await.unwrap();
    assert!(!resumed);
    assert!(!output.is_success());
    let calls = std::fs::read_to_string(&counter).unwrap();
    assert_eq!(calls.lines().count(), 1, "should not have retried");
}

#[tokio::test]
async fn sentinel_stderr_on_resume_triggers_exactly_one_create_retry() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(
        &dir,
        "agent",
        r#"
        if [ "$1" = "-r" ]; then
            echo "No conversation found" 1>&2
            exit 1
        else
            echo created
            exit 0
        fi
        "#,
    );

    let (output, resumed) = spawn_with_resume_fallback(&bin, &AgentId::new("alice"), "sess1", "hi", &[]).await.unwrap();
    assert!(!resumed, "should report that the create fallback ran");
    assert!(output.is_success());
    assert_eq!(output.stdout.trim(), "created");
}

#[tokio::test]
async fn agent_id_env_var_is_propagated() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(&dir, "agent", "echo \"$AGENT_ID\"");

    let (output, _) = spawn_with_resume_fallback(&bin, &AgentId::new("alice"), "sess1", "hi", &[]).await.unwrap();
    assert_eq!(output.stdout.trim(), "alice");
}

#[tokio::test]
async fn extra_env_is_propagated_for_ask_agent() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(&dir, "agent", "echo \"$ASK_DEPTH:$ASK_CALLER_CHAIN\"");

    let extra = vec![("ASK_DEPTH".to_string(), "1".to_string()), ("ASK_CALLER_CHAIN".to_string(), "bob".to_string())];
    let (output, _) = spawn_with_resume_fallback(&bin, &AgentId::new("alice"), "sess1", "hi", &extra).await.unwrap();
    assert_eq!(output.stdout.trim(), "1:bob");
}

#[tokio::test]
async fn timeout_kills_the_child_and_returns_a_timeout_error() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(&dir, "agent", "sleep 5; echo should_not_print");

    let result =
        spawn_with_timeout(&bin, &AgentId::new("alice"), "sess1", "hi", &[], std::time::Duration::from_millis(50))
            .await;
    assert!(matches!(result, Err(SpawnError::Timeout(_))));
}

#[tokio::test]
async fn a_fast_command_completes_within_its_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(&dir, "agent", "echo done");

    let output =
        spawn_with_timeout(&bin, &AgentId::new("alice"), "sess1", "hi", &[], std::time::Duration::from_secs(5))
            .await
            .unwrap();
    assert_eq!(output.stdout.trim(), "done");
}
