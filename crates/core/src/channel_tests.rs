// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn agents(names: &[&str]) -> Vec<AgentId> {
    names.iter().map(|n| AgentId::new(*n)).collect()
}

#[test]
fn parses_single_mention() {
    let dispatchable = agents(&["alice", "bob"]);
    let mentions = parse_mentions("@alice can you look at this?", &dispatchable);
    assert_eq!(mentions, vec![AgentId::new("alice")]);
}

#[test]
fn team_expands_to_all_dispatchable_agents() {
    let dispatchable = agents(&["alice", "bob", "charlie"]);
    let mentions = parse_mentions("@team please review", &dispatchable);
    assert_eq!(mentions, dispatchable);
}

#[test]
fn mentions_of_non_dispatchable_names_are_dropped() {
    let dispatchable = agents(&["alice"]);
    let mentions = parse_mentions("@bob @alice hello", &dispatchable);
    assert_eq!(mentions, vec![AgentId::new("alice")]);
}

#[test]
fn duplicate_mentions_collapse_preserving_order() {
    let dispatchable = agents(&["alice", "bob"]);
    let mentions = parse_mentions("@alice @bob @alice", &dispatchable);
    assert_eq!(mentions, vec![AgentId::new("alice"), AgentId::new("bob")]);
}

#[test]
fn no_mentions_in_plain_content() {
    let dispatchable = agents(&["alice"]);
    assert!(parse_mentions("just a normal message", &dispatchable).is_empty());
}

#[test]
fn channel_message_new_populates_mentions() {
    let dispatchable = agents(&["alice"]);
    let msg = ChannelMessage::new("team", "bob", "@alice hi", 10, &dispatchable);
    assert_eq!(msg.mentions, vec![AgentId::new("alice")]);
    assert_eq!(msg.channel, "team");
}
