// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ask_agent`: bounded synchronous agent-to-agent RPC.
//!
//! Unlike every other trigger path, `ask_agent` bypasses both cooldown and
//! the per-agent busy check by design — it reuses the target's current
//! session id through an independent subprocess call rather than going
//! through the dispatcher's per-agent FSM at all. The invariant of "at most
//! one active subprocess per agent" binds the FSM-mediated paths (poll,
//! mention, standup, manual, orchestrate); `ask_agent` is the one
//! deliberate exception the external interface calls out.

use conclave_adapters::{spawn_with_timeout, SpawnError};
use conclave_core::{AgentId, AskAgentStatus, Clock, DispatchFailure, Event};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::instrument;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::prompt::{ask_agent_body, build_prompt, PromptContext, TriggerReason};

const PREVIEW_LEN: usize = 200;

/// Process-wide call counter, shared across every `ask_agent` invocation.
/// One instance lives for the process's lifetime (it is not per-session:
/// the spec caps calls "per process", resetting only on restart).
pub struct AskAgentCallCounter {
    count: AtomicU32,
    max: u32,
}

impl AskAgentCallCounter {
    pub fn new(max: u32) -> Self {
        Self { count: AtomicU32::new(0), max }
    }

    /// Reserve one call slot; `false` if the cap has already been reached.
    fn try_reserve(&self) -> bool {
        loop {
            let current = self.count.load(Ordering::SeqCst);
            if current >= self.max {
                return false;
            }
            if self.count.compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
                return true;
            }
        }
    }
}

/// The caller-carried context threaded through nested `ask_agent` calls via
/// `ASK_DEPTH`/`ASK_CALLER_CHAIN` environment variables on the child.
#[derive(Debug, Clone)]
pub struct AskAgentContext {
    pub caller: AgentId,
    pub depth: u8,
    pub caller_chain: Vec<AgentId>,
}

impl AskAgentContext {
    /// Context for a top-level call (not itself the product of a nested
    /// `ask_agent`): depth 0, empty chain.
    pub fn top_level(caller: AgentId) -> Self {
        Self { caller, depth: 0, caller_chain: Vec::new() }
    }
}

fn truncate_preview(content: &str) -> String {
    content.chars().take(PREVIEW_LEN).collect()
}

/// Invoke `target` with `question` on behalf of `ctx.caller`. Checks, in
/// order: valid target, depth cap, process-wide call cap, no self-call, no
/// cycle. On success returns the target's stdout verbatim.
#[instrument(skip(dispatcher, counter, question), fields(caller = %ctx.caller, target = %target, depth = ctx.depth))]
pub async fn ask_agent<C: Clock>(
    dispatcher: &Dispatcher<C>,
    counter: &AskAgentCallCounter,
    max_depth: u8,
    timeout: Duration,
    ctx: AskAgentContext,
    target: &AgentId,
    question: &str,
) -> Result<String, DispatchError> {
    if !dispatcher.is_dispatchable(target) {
        let valid = dispatcher.dispatchable_agents().iter().map(AgentId::as_str).collect::<Vec<_>>().join(", ");
        return Err(DispatchError::Dispatch(DispatchFailure::InvalidInput(format!(
            "unknown agent: {target}; valid targets: {valid}"
        ))));
    }
    if ctx.depth >= max_depth {
        return Err(DispatchError::Dispatch(DispatchFailure::PolicyViolation(format!(
            "ask_agent depth cap ({max_depth}) reached; use an async message instead"
        ))));
    }
    if !counter.try_reserve() {
        return Err(DispatchError::Dispatch(DispatchFailure::PolicyViolation(
            "ask_agent call cap reached for this process; use an async message instead".to_string(),
        )));
    }
    if target == &ctx.caller {
        return Err(DispatchError::Dispatch(DispatchFailure::PolicyViolation(
            "ask_agent cannot target the caller itself".to_string(),
        )));
    }
    if ctx.caller_chain.contains(target) {
        return Err(DispatchError::Dispatch(DispatchFailure::PolicyViolation(format!(
            "ask_agent cycle detected: {target} already in the caller chain"
        ))));
    }

    let depth = ctx.depth + 1;
    let mut chain = ctx.caller_chain.clone();
    chain.push(ctx.caller.clone());
    let chain_csv = chain.iter().map(AgentId::as_str).collect::<Vec<_>>().join(",");

    dispatcher.bus().publish(
        Event::AgentConversation {
            caller: ctx.caller.clone(),
            callee: target.clone(),
            depth,
            status: AskAgentStatus::Started,
            preview: Some(truncate_preview(question)),
        },
        dispatcher.clock(),
    );

    let session_id = conclave_storage::get_session(dispatcher.pool(), target, dispatcher.clock().epoch_ms())
        .await
        .map_err(DispatchError::Storage)?;

    let prompt_ctx = PromptContext::new(TriggerReason::AskAgent, "ask_agent", ctx.caller.to_string());
    let body = ask_agent_body(question);
    let prompt = build_prompt(target, &prompt_ctx, dispatcher.clock().epoch_ms(), &body);
    let extra_env = vec![("ASK_DEPTH".to_string(), depth.to_string()), ("ASK_CALLER_CHAIN".to_string(), chain_csv)];

    dispatcher.record_ask_agent_spawn(target).await;
    let result = spawn_with_timeout(dispatcher.agent_bin(), target, session_id.as_str(), &prompt, &extra_env, timeout).await;

    match &result {
        Ok(output) => dispatcher.record_ask_agent_exit(target, output.exit_code).await,
        Err(SpawnError::Timeout(_)) => dispatcher.record_ask_agent_exit(target, None).await,
        Err(SpawnError::ExecFailed(_)) => dispatcher.record_ask_agent_spawn_failed(target).await,
        Err(SpawnError::NonZeroExit { exit_code, .. }) => dispatcher.record_ask_agent_exit(target, *exit_code).await,
    }

    dispatcher.bus().publish(
        Event::AgentConversation {
            caller: ctx.caller.clone(),
            callee: target.clone(),
            depth,
            status: AskAgentStatus::Completed,
            preview: None,
        },
        dispatcher.clock(),
    );

    match result {
        Ok(output) if output.is_success() => Ok(output.stdout),
        Ok(output) => Err(DispatchError::Spawn(SpawnError::NonZeroExit { exit_code: output.exit_code, stderr: output.stderr })),
        Err(err) => Err(DispatchError::Spawn(err)),
    }
}

#[cfg(test)]
#[path = "ask_agent_tests.rs"]
mod tests;
