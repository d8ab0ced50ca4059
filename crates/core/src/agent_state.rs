// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent dispatch state machine.
//!
//! This module holds the pure, clock-driven part of the state machine
//! described in the dispatcher spec: the three states (Idle/Cooldown/Active)
//! and the bookkeeping fields used to compute `canTrigger` and health. It
//! deliberately does not hold a subprocess handle — that lives alongside this
//! struct in the daemon crate, which is the only place that needs to know
//! what a "process" actually is.

use crate::clock::Clock;
use std::time::{Duration, Instant};

/// The three dispatch states from the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Cooldown,
    Active,
}

/// Derived, non-persisted health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Green,
    Yellow,
    Red,
}

/// Threshold after which an Active agent is considered stuck.
pub const STUCK_THRESHOLD: Duration = Duration::from_secs(120);

/// Bookkeeping for one dispatchable agent.
#[derive(Debug, Clone)]
pub struct AgentRuntimeState {
    active: bool,
    last_trigger_time: Option<Instant>,
    last_active_start: Option<Instant>,
    last_seen_message_time_ms: u64,
    trigger_count: u64,
    last_exit_code: Option<i32>,
}

impl Default for AgentRuntimeState {
    fn default() -> Self {
        Self {
            active: false,
            last_trigger_time: None,
            last_active_start: None,
            last_seen_message_time_ms: 0,
            trigger_count: 0,
            last_exit_code: None,
        }
    }
}

impl AgentRuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, clock: &impl Clock, cooldown: Duration) -> DispatchState {
        if self.active {
            return DispatchState::Active;
        }
        match self.last_trigger_time {
            Some(t) if clock.now().saturating_duration_since(t) < cooldown => DispatchState::Cooldown,
            _ => DispatchState::Idle,
        }
    }

    /// `canTrigger`: true iff idle, i.e. not active and cooldown has elapsed.
    ///
    /// `bypass_cooldown` is set by callers that are allowed to ignore the
    /// cooldown (manual trigger, ask_agent, standup) — they still fail while
    /// Active.
    pub fn can_trigger(&self, clock: &impl Clock, cooldown: Duration, bypass_cooldown: bool) -> bool {
        if self.active {
            return false;
        }
        bypass_cooldown || matches!(self.state(clock, cooldown), DispatchState::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_seen_message_time_ms(&self) -> u64 {
        self.last_seen_message_time_ms
    }

    /// Advance `lastSeenMessageTime`. No-op if `new_ts` does not advance it
    /// (the invariant is monotonic-non-decreasing outside of `reset_for_refresh`).
    pub fn advance_last_seen_message_time(&mut self, new_ts_ms: u64) {
        if new_ts_ms > self.last_seen_message_time_ms {
            self.last_seen_message_time_ms = new_ts_ms;
        }
    }

    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    pub fn last_exit_code(&self) -> Option<i32> {
        self.last_exit_code
    }

    pub fn last_active_start(&self) -> Option<Instant> {
        self.last_active_start
    }

    /// Record a spawn becoming Active. Call exactly once per trigger
    /// acceptance (the resume->create retry reuses the same mark).
    pub fn mark_spawned(&mut self, clock: &impl Clock) {
        self.active = true;
        self.last_trigger_time = Some(clock.now());
        self.last_active_start = Some(clock.now());
        self.trigger_count += 1;
    }

    /// Record the subprocess exiting; transitions Active -> Cooldown.
    pub fn mark_exited(&mut self, exit_code: Option<i32>) {
        self.active = false;
        self.last_active_start = None;
        self.last_exit_code = exit_code;
    }

    /// Record a spawn attempt that never started a process at all (exec
    /// error): returns to Idle immediately rather than Cooldown, per spec
    /// failure semantics.
    pub fn mark_spawn_failed(&mut self) {
        self.active = false;
        self.last_active_start = None;
        self.last_trigger_time = None;
    }

    /// `refreshAgentSession`: resets `lastSeenMessageTime` and `lastExitCode`.
    pub fn reset_for_refresh(&mut self) {
        self.last_seen_message_time_ms = 0;
        self.last_exit_code = None;
    }

    pub fn health(&self, clock: &impl Clock, cooldown: Duration) -> Health {
        if self.active {
            let stuck = self
                .last_active_start
                .map(|start| clock.now().saturating_duration_since(start) >= STUCK_THRESHOLD)
                .unwrap_or(false);
            return if stuck { Health::Red } else { Health::Yellow };
        }
        match self.state(clock, cooldown) {
            DispatchState::Cooldown => Health::Yellow,
            DispatchState::Idle => match self.last_exit_code {
                Some(0) | None => Health::Green,
                Some(_) => Health::Red,
            },
            DispatchState::Active => unreachable!("handled above"),
        }
    }
}

#[cfg(test)]
#[path = "agent_state_tests.rs"]
mod tests;
