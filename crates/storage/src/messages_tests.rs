// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::pool::open_in_memory;

#[tokio::test]
async fn a_direct_message_is_unread_only_for_its_recipient() {
    let pool = open_in_memory().await.unwrap();
    insert_message(&pool, &UserId::new("bob"), "alice", "hi", 1).await.unwrap();

    let (count, unread) = unread_for(&pool, &AgentId::new("alice")).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(unread[0].content, "hi");

    let (count, _) = unread_for(&pool, &AgentId::new("charlie")).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn a_broadcast_message_is_unread_for_every_agent() {
    let pool = open_in_memory().await.unwrap();
    insert_message(&pool, &UserId::new("bob"), BROADCAST, "standup time", 1).await.unwrap();

    for agent in ["alice", "charlie"] {
        let (count, _) = unread_for(&pool, &AgentId::new(agent)).await.unwrap();
        assert_eq!(count, 1);
    }
}

#[tokio::test]
async fn marking_read_removes_the_message_from_the_next_unread_query() {
    let pool = open_in_memory().await.unwrap();
    let message = insert_message(&pool, &UserId::new("bob"), "alice", "hi", 1).await.unwrap();

    mark_read(&pool, &message.id, &AgentId::new("alice")).await.unwrap();

    let (count, _) = unread_for(&pool, &AgentId::new("alice")).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn marking_read_twice_is_not_an_error() {
    let pool = open_in_memory().await.unwrap();
    let message = insert_message(&pool, &UserId::new("bob"), "alice", "hi", 1).await.unwrap();
    let agent = AgentId::new("alice");
    mark_read(&pool, &message.id, &agent).await.unwrap();
    mark_read(&pool, &message.id, &agent).await.unwrap();
}

#[tokio::test]
async fn unread_messages_are_ordered_oldest_first() {
    let pool = open_in_memory().await.unwrap();
    insert_message(&pool, &UserId::new("bob"), "alice", "second", 20).await.unwrap();
    insert_message(&pool, &UserId::new("bob"), "alice", "first", 10).await.unwrap();

    let (_, unread) = unread_for(&pool, &AgentId::new("alice")).await.unwrap();
    assert_eq!(unread[0].content, "first");
    assert_eq!(unread[1].content, "second");
}

#[tokio::test]
async fn post_standup_persists_without_error() {
    let pool = open_in_memory().await.unwrap();
    post_standup(&pool, &AgentId::new("alice"), "sess_abc", "all done", 1).await.unwrap();
}
