// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DM poll loop: every `poll_interval`, scan each dispatchable agent's
//! unread messages and trigger a `dm` spawn for any batch not already seen.

use conclave_core::{AgentId, Clock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::dispatcher::Dispatcher;
use crate::prompt::{dm_body, PromptContext, TriggerReason};

/// One poll tick across every dispatchable agent.
#[instrument(skip(dispatcher))]
pub async fn poll_once<C: Clock>(dispatcher: &Dispatcher<C>) {
    for agent in dispatcher.dispatchable_agents().to_vec() {
        poll_agent(dispatcher, &agent).await;
    }
}

async fn poll_agent<C: Clock>(dispatcher: &Dispatcher<C>, agent: &AgentId) {
    let (count, messages) = match conclave_storage::unread_for(dispatcher.pool(), agent).await {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(agent = %agent, error = %err, "poll tick: unread_for failed");
            return;
        }
    };
    if count == 0 {
        return;
    }

    let newest = messages
        .iter()
        .max_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms).then_with(|| a.id.as_str().cmp(b.id.as_str())))
        .expect("count > 0 implies at least one message");

    if dispatcher.accept_poll_batch(agent, newest.timestamp_ms).await.is_none() {
        tracing::debug!(agent = %agent, "poll tick: suppressed (already seen, cooldown, or busy)");
        return;
    }

    let mut seen_senders = HashSet::new();
    let senders: Vec<String> =
        messages.iter().map(|m| m.from.to_string()).filter(|s| seen_senders.insert(s.clone())).collect();
    let first = &messages[0];

    let ctx = PromptContext::new(TriggerReason::Dm, "poll", first.from.to_string())
        .with_senders(senders)
        .with_preview(first.content.clone());

    if let Err(err) = dispatcher.trigger(agent, ctx, dm_body()).await {
        tracing::warn!(agent = %agent, error = %err, "poll-triggered spawn rejected");
    }
}

/// Long-running poll loop task. `enabled` is re-checked every tick so
/// `DISPATCHER_ENABLED=false` can suspend polling without tearing the task
/// down (matching the "read-only / inspection mode" requirement).
pub async fn run_poll_loop<C: Clock>(
    dispatcher: Arc<Dispatcher<C>>,
    interval: Duration,
    enabled: impl Fn() -> bool + Send + Sync + 'static,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if !enabled() {
            continue;
        }
        poll_once(&dispatcher).await;
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
