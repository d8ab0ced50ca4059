// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn agent(s: &str) -> AgentId {
    AgentId::new(s)
}

#[test]
fn empty_order_refuses_to_start() {
    assert!(StandupQueue::start(vec![], "standup").is_none());
}

#[test]
fn starts_on_the_first_agent() {
    let queue = StandupQueue::start(vec![agent("alice"), agent("bob")], "standup").unwrap();
    assert_eq!(queue.current(), Some(&agent("alice")));
    assert_eq!(queue.status(), StandupStatus::Running);
}

#[test]
fn irrelevant_channel_messages_do_not_advance_the_queue() {
    let mut queue = StandupQueue::start(vec![agent("alice"), agent("bob")], "standup").unwrap();
    assert!(!queue.on_channel_message("general", "alice"));
    assert_eq!(queue.current(), Some(&agent("alice")));
}

#[test]
fn a_message_from_someone_other_than_the_current_agent_does_not_advance() {
    let mut queue = StandupQueue::start(vec![agent("alice"), agent("bob")], "standup").unwrap();
    assert!(!queue.on_channel_message("standup", "bob"));
    assert_eq!(queue.current(), Some(&agent("alice")));
}

#[test]
fn the_current_agent_posting_to_the_standup_channel_advances_the_queue() {
    let mut queue = StandupQueue::start(vec![agent("alice"), agent("bob")], "standup").unwrap();
    assert!(queue.on_channel_message("standup", "alice"));
    assert_eq!(queue.current(), Some(&agent("bob")));
}

#[test]
fn advancing_past_the_last_agent_finishes_the_standup() {
    let mut queue = StandupQueue::start(vec![agent("alice")], "standup").unwrap();
    assert!(queue.on_channel_message("standup", "alice"));
    assert_eq!(queue.current(), None);
    assert_eq!(queue.status(), StandupStatus::Finished);
}

#[test]
fn finished_standup_ignores_further_messages() {
    let mut queue = StandupQueue::start(vec![agent("alice")], "standup").unwrap();
    queue.advance();
    assert!(!queue.on_channel_message("standup", "alice"));
    assert_eq!(queue.status(), StandupStatus::Finished);
}

#[test]
fn remaining_reports_agents_not_yet_taken_their_turn() {
    let mut queue = StandupQueue::start(vec![agent("alice"), agent("bob"), agent("carol")], "standup").unwrap();
    queue.advance();
    assert_eq!(queue.remaining(), &[agent("bob"), agent("carol")]);
}

#[test]
fn completed_reports_agents_whose_turn_has_already_passed() {
    let mut queue = StandupQueue::start(vec![agent("alice"), agent("bob"), agent("carol")], "standup").unwrap();
    assert_eq!(queue.completed(), &[] as &[AgentId]);
    queue.advance();
    assert_eq!(queue.completed(), &[agent("alice")]);
    queue.advance();
    queue.advance();
    assert_eq!(queue.completed(), &[agent("alice"), agent("bob"), agent("carol")]);
}
