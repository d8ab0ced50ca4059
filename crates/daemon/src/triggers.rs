// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger sinks fed by the channel-append path: the per-mention trigger and
//! the manual (operator-initiated) trigger. Both go through
//! [`Dispatcher::trigger`], so both still respect the busy check — mention
//! triggers additionally bypass cooldown via [`TriggerReason::Mention`]
//! being left out of that bypass set, which means an already-cooling-down
//! agent simply misses this mention rather than being re-enqueued for it.

use conclave_core::{AgentId, ChannelMessage, Clock, DispatchFailure, SessionId};
use tracing::instrument;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::prompt::{manual_body, mention_body, PromptContext, TriggerReason};
use crate::standup::StandupRunner;

/// Called once per appended channel message: advances any running standup
/// waiting on this sender, then fires a mention trigger for every
/// dispatchable agent `@mentioned` in it.
pub async fn on_channel_message_posted<C: Clock>(
    dispatcher: &Dispatcher<C>,
    standup: &StandupRunner<C>,
    message: &ChannelMessage,
) {
    let from = AgentId::new(message.from.clone());
    standup.on_channel_message(&message.channel, &from, &message.content, message.timestamp_ms).await;

    for agent in &message.mentions {
        trigger_for_channel(dispatcher, agent, &message.channel, &message.from, &message.content).await;
    }
}

/// `triggerForChannel`: silently skipped (not re-enqueued) when the
/// mentioned agent is Active or still in cooldown.
#[instrument(skip(dispatcher, content), fields(agent = %agent, channel))]
async fn trigger_for_channel<C: Clock>(dispatcher: &Dispatcher<C>, agent: &AgentId, channel: &str, from: &str, content: &str) {
    let ctx = PromptContext::new(TriggerReason::Mention, "channel", from.to_string())
        .with_channel(channel.to_string())
        .with_preview(content.to_string());

    match dispatcher.trigger(agent, ctx, mention_body(channel)).await {
        Ok(_) => {}
        Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { .. })) => {
            tracing::debug!(agent = %agent, channel, "mention trigger skipped, agent busy or cooling down");
        }
        Err(err) => {
            tracing::warn!(agent = %agent, channel, error = %err, "mention trigger failed to start");
        }
    }
}

/// `triggerManual`: operator-initiated spawn. Bypasses cooldown but, like
/// every other path, still rejects an Active agent.
pub async fn trigger_manual<C: Clock>(
    dispatcher: &Dispatcher<C>,
    agent: &AgentId,
    instruction: &str,
    sender: impl Into<String>,
) -> Result<SessionId, DispatchError> {
    let ctx = PromptContext::new(TriggerReason::Manual, "manual", sender);
    dispatcher.trigger(agent, ctx, manual_body(instruction)).await
}

#[cfg(test)]
#[path = "triggers_tests.rs"]
mod tests;
