// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::pool::open_in_memory;

fn agents(names: &[&str]) -> Vec<AgentId> {
    names.iter().map(|n| AgentId::new(*n)).collect()
}

#[tokio::test]
async fn appending_parses_mentions_and_writes_both_sqlite_and_jsonl() {
    let pool = open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dispatchable = agents(&["alice", "bob"]);

    let message = append_channel_message(&pool, dir.path(), "general", "bob", "@alice hi", 10, &dispatchable)
        .await
        .unwrap();

    assert_eq!(message.mentions, vec![AgentId::new("alice")]);

    let jsonl_path = dir.path().join("general.jsonl");
    let contents = tokio::fs::read_to_string(&jsonl_path).await.unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.contains("@alice hi"));
}

#[tokio::test]
async fn read_channel_messages_returns_oldest_first() {
    let pool = open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dispatchable = agents(&["alice"]);

    append_channel_message(&pool, dir.path(), "general", "bob", "first", 10, &dispatchable).await.unwrap();
    append_channel_message(&pool, dir.path(), "general", "bob", "second", 20, &dispatchable).await.unwrap();

    let messages = read_channel_messages(&pool, "general", 10).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "first");
    assert_eq!(messages[1].content, "second");
}

#[tokio::test]
async fn unread_channel_messages_excludes_what_has_been_marked_read() {
    let pool = open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dispatchable = agents(&["alice"]);
    let agent = AgentId::new("alice");

    append_channel_message(&pool, dir.path(), "general", "bob", "first", 10, &dispatchable).await.unwrap();
    append_channel_message(&pool, dir.path(), "general", "bob", "second", 20, &dispatchable).await.unwrap();

    mark_channel_read(&pool, "general", &agent, 10).await.unwrap();

    let unread = get_unread_channel_messages(&pool, "general", &agent).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].content, "second");
}

#[tokio::test]
async fn marking_channel_read_is_scoped_to_that_channel() {
    let pool = open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dispatchable = agents(&["alice"]);
    let agent = AgentId::new("alice");

    append_channel_message(&pool, dir.path(), "general", "bob", "hi", 10, &dispatchable).await.unwrap();
    append_channel_message(&pool, dir.path(), "random", "bob", "hi", 10, &dispatchable).await.unwrap();

    mark_channel_read(&pool, "general", &agent, 10).await.unwrap();

    assert!(get_unread_channel_messages(&pool, "general", &agent).await.unwrap().is_empty());
    assert_eq!(get_unread_channel_messages(&pool, "random", &agent).await.unwrap().len(), 1);
}
