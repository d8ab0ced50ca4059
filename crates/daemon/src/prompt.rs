// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt construction: the `<dispatch_context>` header every spawned prompt
//! carries, plus the trigger-specific instruction bodies.

use conclave_core::AgentId;
use serde::Serialize;

/// The reason a spawn was requested. Determines both the cooldown-bypass
/// policy and the instruction body appended to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Dm,
    Mention,
    Standup,
    AskAgent,
    Orchestrate,
    Manual,
}

impl TriggerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dm => "dm",
            Self::Mention => "mention",
            Self::Standup => "standup",
            Self::AskAgent => "ask_agent",
            Self::Orchestrate => "orchestrate",
            Self::Manual => "manual",
        }
    }

    /// Whether this trigger path bypasses the cooldown window. It still
    /// fails while the agent is Active: bypassing cooldown is not the same
    /// as bypassing the busy check.
    pub fn bypasses_cooldown(self) -> bool {
        matches!(self, Self::AskAgent | Self::Standup | Self::Orchestrate | Self::Manual)
    }
}

#[derive(Serialize)]
struct DispatchContext<'a> {
    timestamp: u64,
    agent_id: &'a str,
    trigger: &'static str,
    source: &'a str,
    sender: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    senders: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_preview: Option<&'a str>,
}

/// Everything needed to build a `<dispatch_context>` header for one spawn.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub trigger: TriggerReason,
    pub source: String,
    pub sender: String,
    pub senders: Option<Vec<String>>,
    pub channel: Option<String>,
    pub message_preview: Option<String>,
}

impl PromptContext {
    pub fn new(trigger: TriggerReason, source: impl Into<String>, sender: impl Into<String>) -> Self {
        Self { trigger, source: source.into(), sender: sender.into(), senders: None, channel: None, message_preview: None }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_senders(mut self, senders: Vec<String>) -> Self {
        self.senders = Some(senders);
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.message_preview = Some(truncate_preview(&preview.into()));
        self
    }
}

const PREVIEW_LEN: usize = 200;

fn truncate_preview(content: &str) -> String {
    content.chars().take(PREVIEW_LEN).collect()
}

/// Build the full prompt: a `<dispatch_context>{...json...}` header line, a
/// blank line, then the trigger-specific instruction body.
pub fn build_prompt(agent_id: &AgentId, ctx: &PromptContext, timestamp_ms: u64, body: &str) -> String {
    let header = DispatchContext {
        timestamp: timestamp_ms,
        agent_id: agent_id.as_str(),
        trigger: ctx.trigger.as_str(),
        source: &ctx.source,
        sender: &ctx.sender,
        senders: ctx.senders.as_deref(),
        channel: ctx.channel.as_deref(),
        message_preview: ctx.message_preview.as_deref(),
    };
    let header_json = serde_json::to_string(&header).unwrap_or_else(|_| "{}".to_string());
    format!("<dispatch_context>{header_json}\n\n{body}")
}

pub fn dm_body() -> String {
    "You have unread direct messages. List your unread messages and reply to each via a DM write.".to_string()
}

pub fn mention_body(channel: &str) -> String {
    format!("You were @mentioned in channel \"{channel}\". Read the channel's unread messages and reply there.")
}

pub fn standup_body(channel: &str) -> String {
    format!("It is your turn in the standup. Post your status update to channel \"{channel}\".")
}

pub fn ask_agent_body(question: &str) -> String {
    format!("You have been asked a question by another agent:\n\n{question}")
}

pub fn orchestrate_body(command: &str, params: &str) -> String {
    format!("Run orchestrator command \"{command}\" with parameters: {params}")
}

pub fn manual_body(instruction: &str) -> String {
    instruction.to_string()
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
