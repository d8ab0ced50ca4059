// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent dispatch: owns the concurrent agent-state table, turns an
//! accepted trigger into a subprocess spawn, and reconciles the exit back
//! into the state machine. One `tokio::sync::Mutex` per agent entry in a
//! `DashMap` — never a single lock over all agents — and the lock is held
//! only across the decision and the state transition, never across the
//! subprocess call itself (see the concurrency model this implements).

use conclave_adapters::spawn_with_resume_fallback;
use conclave_core::{AgentId, AgentRuntimeState, Clock, DispatchFailure, Event, Health, SessionId};
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::instrument;

use crate::bus::EventBus;
use crate::error::DispatchError;
use crate::prompt::{build_prompt, PromptContext};

/// Per-agent FSM state plus a snapshot for `dispatcher_status`.
#[derive(Debug, Clone)]
pub struct AgentStatus {
    pub agent_id: AgentId,
    pub health: Health,
    pub trigger_count: u64,
    pub last_exit_code: Option<i32>,
    pub active_seconds: Option<u64>,
}

pub struct Dispatcher<C: Clock> {
    states: DashMap<AgentId, Arc<AsyncMutex<AgentRuntimeState>>>,
    dispatchable: Vec<AgentId>,
    clock: C,
    cooldown: Duration,
    pool: SqlitePool,
    agent_bin: String,
    bus: EventBus,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(dispatchable: Vec<AgentId>, clock: C, cooldown: Duration, pool: SqlitePool, agent_bin: String, bus: EventBus) -> Self {
        Self { states: DashMap::new(), dispatchable, clock, cooldown, pool, agent_bin, bus }
    }

    pub fn is_dispatchable(&self, agent: &AgentId) -> bool {
        self.dispatchable.iter().any(|a| a == agent)
    }

    pub fn dispatchable_agents(&self) -> &[AgentId] {
        &self.dispatchable
    }

    fn entry(&self, agent: &AgentId) -> Arc<AsyncMutex<AgentRuntimeState>> {
        Arc::clone(self.states.entry(agent.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(AgentRuntimeState::new()))).value())
    }

    pub async fn health(&self, agent: &AgentId) -> Option<Health> {
        if !self.is_dispatchable(agent) {
            return None;
        }
        let state = self.entry(agent);
        let guard = state.lock().await;
        Some(guard.health(&self.clock, self.cooldown))
    }

    /// Snapshot of every dispatchable agent's FSM state, for `dispatcher_status`.
    pub async fn status(&self) -> Vec<AgentStatus> {
        let mut out = Vec::with_capacity(self.dispatchable.len());
        for agent in &self.dispatchable {
            let state = self.entry(agent);
            let guard = state.lock().await;
            let active_seconds = guard
                .last_active_start()
                .map(|start| self.clock.now().saturating_duration_since(start).as_secs());
            out.push(AgentStatus {
                agent_id: agent.clone(),
                health: guard.health(&self.clock, self.cooldown),
                trigger_count: guard.trigger_count(),
                last_exit_code: guard.last_exit_code(),
                active_seconds,
            });
        }
        out
    }

    pub fn publish_status(&self, enabled: bool) {
        self.bus.publish(Event::DispatcherStatus { enabled }, &self.clock);
    }

    /// Atomically test-and-advance `lastSeenMessageTime` for the poll loop:
    /// returns `None` (without advancing anything) when `newest_ts` has
    /// already been seen or the agent cannot currently be triggered,
    /// otherwise advances and returns `newest_ts`. Doing the check and the
    /// advance under one lock is what keeps step 4/5 of the poll algorithm
    /// from silently dropping a batch observed mid-cooldown.
    pub async fn accept_poll_batch(&self, agent: &AgentId, newest_ts: u64) -> Option<u64> {
        let state = self.entry(agent);
        let mut guard = state.lock().await;
        if newest_ts <= guard.last_seen_message_time_ms() {
            return None;
        }
        if !guard.can_trigger(&self.clock, self.cooldown, false) {
            return None;
        }
        guard.advance_last_seen_message_time(newest_ts);
        Some(newest_ts)
    }

    /// Accept-or-reject a trigger and, on acceptance, spawn the subprocess in
    /// the background (this call does not wait for it to exit). Returns the
    /// session id the subprocess was (or will be) invoked against.
    #[instrument(skip(self, ctx, body), fields(agent = %agent, reason = ctx.trigger.as_str()))]
    pub async fn trigger(&self, agent: &AgentId, ctx: PromptContext, body: String) -> Result<SessionId, DispatchError> {
        if !self.is_dispatchable(agent) {
            return Err(DispatchError::Dispatch(DispatchFailure::InvalidInput(format!("unknown agent: {agent}"))));
        }

        let reason = ctx.trigger;
        let state = self.entry(agent);
        {
            let mut guard = state.lock().await;
            if !guard.can_trigger(&self.clock, self.cooldown, reason.bypasses_cooldown()) {
                return Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { agent: agent.to_string() }));
            }
            guard.mark_spawned(&self.clock);
        }

        let session_id = match conclave_storage::get_session(&self.pool, agent, self.clock.epoch_ms()).await {
            Ok(sid) => sid,
            Err(err) => {
                let mut guard = state.lock().await;
                guard.mark_spawn_failed();
                drop(guard);
                return Err(DispatchError::Storage(err));
            }
        };

        // Emitted here, at the Idle->Active transition, rather than after the
        // subprocess exits: `resumed` isn't knowable yet, so it's carried as
        // `None` until the resume/create fallback resolves.
        self.bus.publish(
            Event::AgentTriggered { agent_id: agent.clone(), session_id: session_id.clone(), resumed: None },
            &self.clock,
        );

        let prompt = build_prompt(agent, &ctx, self.clock.epoch_ms(), &body);

        let agent = agent.clone();
        let state_for_task = Arc::clone(&state);
        let bus = self.bus.clone();
        let clock = self.clock.clone();
        let agent_bin = self.agent_bin.clone();
        let sid = session_id.clone();

        tokio::spawn(async move {
            run_spawned(agent, state_for_task, bus, clock, agent_bin, sid, prompt).await;
        });

        Ok(session_id)
    }

    /// `refreshAgentSession`: deletes stored sessions and resets runtime
    /// bookkeeping. Rejected with a concurrency conflict when Active unless
    /// `force` is set.
    #[instrument(skip(self), fields(agent = %agent, force))]
    pub async fn refresh_agent_session(&self, agent: &AgentId, force: bool) -> Result<SessionId, DispatchError> {
        if !self.is_dispatchable(agent) {
            return Err(DispatchError::Dispatch(DispatchFailure::InvalidInput(format!("unknown agent: {agent}"))));
        }
        let state = self.entry(agent);
        {
            let guard = state.lock().await;
            if guard.is_active() && !force {
                return Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { agent: agent.to_string() }));
            }
        }

        conclave_storage::delete_sessions(&self.pool, agent).await.map_err(DispatchError::Storage)?;
        let new_session = conclave_storage::get_session(&self.pool, agent, self.clock.epoch_ms()).await.map_err(DispatchError::Storage)?;

        {
            let mut guard = state.lock().await;
            guard.reset_for_refresh();
        }

        self.bus.publish(
            Event::SessionRefreshed { agent_id: agent.clone(), session_id: new_session.clone() },
            &self.clock,
        );
        Ok(new_session)
    }

    /// Record an `ask_agent` call starting against `target`'s runtime state.
    /// `ask_agent` bypasses the busy/cooldown acceptance check, but the call
    /// still counts as recent activity for health and cooldown purposes.
    pub async fn record_ask_agent_spawn(&self, target: &AgentId) {
        let state = self.entry(target);
        let mut guard = state.lock().await;
        guard.mark_spawned(&self.clock);
    }

    /// Record an `ask_agent` call's subprocess exiting.
    pub async fn record_ask_agent_exit(&self, target: &AgentId, exit_code: Option<i32>) {
        let state = self.entry(target);
        let mut guard = state.lock().await;
        guard.mark_exited(exit_code);
    }

    /// Record an `ask_agent` call whose subprocess never started at all.
    pub async fn record_ask_agent_spawn_failed(&self, target: &AgentId) {
        let state = self.entry(target);
        let mut guard = state.lock().await;
        guard.mark_spawn_failed();
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn agent_bin(&self) -> &str {
        &self.agent_bin
    }
}

async fn run_spawned(
    agent: AgentId,
    state: Arc<AsyncMutex<AgentRuntimeState>>,
    bus: EventBus,
    clock: impl Clock,
    agent_bin: String,
    session_id: SessionId,
    prompt: String,
) {
    match spawn_with_resume_fallback(&agent_bin, &agent, session_id.as_str(), &prompt, &[]).await {
        Ok((output, resumed)) => {
            tracing::info!(agent = %agent, resumed, exit_code = ?output.exit_code, "agent subprocess exited");
            let mut guard = state.lock().await;
            guard.mark_exited(output.exit_code);
            drop(guard);
            bus.publish(
                Event::AgentSessionEnded { agent_id: agent.clone(), session_id, exit_code: output.exit_code },
                &clock,
            );
        }
        Err(err) => {
            tracing::warn!(agent = %agent, error = %err, "agent subprocess failed to start");
            let mut guard = state.lock().await;
            guard.mark_spawn_failed();
            drop(guard);
            bus.publish(Event::AgentTriggerFailed { agent_id: agent, reason: err.to_string() }, &clock);
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
