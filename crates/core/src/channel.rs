// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel message model and `@mention` parsing.

use crate::ids::{AgentId, ChannelMessageId};
use serde::{Deserialize, Serialize};

/// Reserved mention token that expands to every dispatchable agent.
pub const TEAM_MENTION: &str = "team";

/// A single append-only channel log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: ChannelMessageId,
    pub channel: String,
    pub from: String,
    pub content: String,
    pub timestamp_ms: u64,
    pub mentions: Vec<AgentId>,
    pub thread_id: Option<String>,
}

impl ChannelMessage {
    /// Build a channel message, parsing `@name` mentions out of `content`.
    ///
    /// `dispatchable` is the current set of dispatchable agents, used to
    /// expand the reserved `@team` token; it is looked up by the caller
    /// (the agent registry is out of scope for this crate).
    pub fn new(
        channel: impl Into<String>,
        from: impl Into<String>,
        content: impl Into<String>,
        timestamp_ms: u64,
        dispatchable: &[AgentId],
    ) -> Self {
        let content = content.into();
        let mentions = parse_mentions(&content, dispatchable);
        Self {
            id: ChannelMessageId::new(),
            channel: channel.into(),
            from: from.into(),
            content,
            timestamp_ms,
            mentions,
            thread_id: None,
        }
    }
}

/// Parse `@name` tokens out of channel message content.
///
/// `@team` expands to every id in `dispatchable`. A mention is only kept if
/// it names a dispatchable agent (mentioning a non-agent user is not an
/// error, it's simply not a mention for dispatch purposes) or is `@team`.
/// Duplicate mentions are collapsed, preserving first-seen order.
pub fn parse_mentions(content: &str, dispatchable: &[AgentId]) -> Vec<AgentId> {
    let mut seen = std::collections::HashSet::new();
    let mut mentions = Vec::new();

    for token in content.split(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '@') {
        let Some(name) = token.strip_prefix('@') else { continue };
        if name.is_empty() {
            continue;
        }
        if name == TEAM_MENTION {
            for agent in dispatchable {
                if seen.insert(agent.clone()) {
                    mentions.push(agent.clone());
                }
            }
            continue;
        }
        if let Some(agent) = dispatchable.iter().find(|a| a.as_str() == name) {
            if seen.insert(agent.clone()) {
                mentions.push(agent.clone());
            }
        }
    }

    mentions
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
