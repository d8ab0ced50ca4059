// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! conclave-core: shared domain types for the coordination daemon.
//!
//! This crate has no I/O. It holds no subprocess handle, no database
//! connection, no socket. Everything here is pure data plus the clock
//! abstraction that lets the daemon crate's scheduling logic be tested
//! without sleeping.

pub mod agent_state;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod ids;
pub mod message;
pub mod orchestrator;
pub mod standup;

pub use agent_state::{AgentRuntimeState, DispatchState, Health, STUCK_THRESHOLD};
pub use channel::{parse_mentions, ChannelMessage, TEAM_MENTION};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::Config;
pub use error::DispatchFailure;
pub use event::{AskAgentStatus, Event, EventEnvelope};
pub use ids::{AgentId, ChannelMessageId, MessageId, OrchestratorSessionId, SessionId, StandupSessionId, UserId};
pub use message::{Message, BROADCAST};
pub use orchestrator::OrchestratorSlot;
pub use standup::{StandupQueue, StandupStatus};
