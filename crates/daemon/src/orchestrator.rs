// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator singleton: at most one long-running orchestrator session at
//! a time. Unlike a normal agent trigger, the orchestrator's concurrency
//! gate is the slot itself, not the per-agent cooldown/busy state machine —
//! so this runner spawns directly through the subprocess adapter rather than
//! through [`crate::dispatcher::Dispatcher::trigger`].

use conclave_adapters::spawn_with_resume_fallback;
use conclave_core::{AgentId, Clock, DispatchFailure, Event, OrchestratorSessionId, OrchestratorSlot};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::instrument;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::prompt::{build_prompt, orchestrate_body, PromptContext, TriggerReason};

/// The agent id the orchestrator's subprocess runs under.
pub const ORCHESTRATOR_AGENT_ID: &str = "orchestrator";

pub struct OrchestratorRunner<C: Clock> {
    dispatcher: Arc<Dispatcher<C>>,
    slot: Arc<Mutex<OrchestratorSlot>>,
}

impl<C: Clock> OrchestratorRunner<C> {
    pub fn new(dispatcher: Arc<Dispatcher<C>>) -> Self {
        Self { dispatcher, slot: Arc::new(Mutex::new(OrchestratorSlot::default())) }
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.lock().is_occupied()
    }

    /// `triggerOrchestrator(command, params)`: rejected if a slot is already
    /// occupied. Frees the slot and emits `orchestrator_ended`/
    /// `orchestrator_failed` when the subprocess exits.
    #[instrument(skip(self, params))]
    pub async fn trigger(
        &self,
        command: &str,
        params: &str,
        channel: Option<String>,
    ) -> Result<OrchestratorSessionId, DispatchError> {
        let session_id = {
            let mut guard = self.slot.lock();
            guard.try_occupy().ok_or_else(|| {
                DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { agent: "orchestrator".to_string() })
            })?
        };

        self.dispatcher
            .bus()
            .publish(Event::OrchestratorStarted { session_id: session_id.clone(), command: command.to_string() }, self.dispatcher.clock());

        let agent_id = AgentId::new(ORCHESTRATOR_AGENT_ID);
        let mut ctx = PromptContext::new(TriggerReason::Orchestrate, "orchestrator", "system");
        if let Some(channel) = channel {
            ctx = ctx.with_channel(channel);
        }
        let body = orchestrate_body(command, params);
        let prompt = build_prompt(&agent_id, &ctx, self.dispatcher.clock().epoch_ms(), &body);

        let agent_bin = self.dispatcher.agent_bin().to_string();
        let bus = self.dispatcher.bus().clone();
        let clock = self.dispatcher.clock().clone();
        let slot = Arc::clone(&self.slot);
        let sid = session_id.clone();

        tokio::spawn(async move {
            let outcome = spawn_with_resume_fallback(&agent_bin, &agent_id, sid.as_str(), &prompt, &[]).await;
            slot.lock().release(&sid);
            match outcome {
                Ok((output, _resumed)) if output.is_success() => {
                    bus.publish(Event::OrchestratorEnded { session_id: sid, exit_code: output.exit_code }, &clock);
                }
                Ok((output, _resumed)) => {
                    bus.publish(
                        Event::OrchestratorFailed { session_id: sid, reason: format!("exit code {:?}", output.exit_code) },
                        &clock,
                    );
                }
                Err(err) => {
                    bus.publish(Event::OrchestratorFailed { session_id: sid, reason: err.to_string() }, &clock);
                }
            }
        });

        Ok(session_id)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
