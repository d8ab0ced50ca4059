// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standup runner: wires the pure [`conclave_core::StandupQueue`] to actual
//! dispatch. Advancement is driven by [`StandupRunner::on_channel_message`],
//! called from the channel-append path, not by subprocess exit — except when
//! a spawn never starts at all, which would otherwise wedge the queue
//! forever waiting for a post that can never come.

use conclave_core::{AgentId, Clock, DispatchFailure, Event, StandupQueue, StandupStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::instrument;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::prompt::{standup_body, PromptContext, TriggerReason};

enum StandupStep {
    Next(AgentId, String),
    Finished(conclave_core::StandupSessionId, Vec<AgentId>),
}

pub struct StandupRunner<C: Clock> {
    dispatcher: Arc<Dispatcher<C>>,
    queue: Mutex<Option<StandupQueue>>,
}

impl<C: Clock> StandupRunner<C> {
    pub fn new(dispatcher: Arc<Dispatcher<C>>) -> Self {
        Self { dispatcher, queue: Mutex::new(None) }
    }

    pub fn is_running(&self) -> bool {
        self.queue.lock().is_some()
    }

    /// `startStandup`: rejected if a standup is already in progress.
    #[instrument(skip(self, agents), fields(channel = %channel.as_ref()))]
    pub async fn start(&self, channel: impl AsRef<str>, agents: Vec<AgentId>) -> Result<(), DispatchError> {
        let channel = channel.as_ref().to_string();
        {
            let mut guard = self.queue.lock();
            if guard.is_some() {
                return Err(DispatchError::Dispatch(DispatchFailure::ConcurrencyConflict { agent: "standup".to_string() }));
            }
            let queue = StandupQueue::start(agents.clone(), channel.clone())
                .ok_or_else(|| DispatchError::Dispatch(DispatchFailure::InvalidInput("standup order must not be empty".to_string())))?;
            self.dispatcher.bus().publish(
                Event::StandupSessionStart { session_id: queue.session_id().clone(), channel, order: agents },
                self.dispatcher.clock(),
            );
            *guard = Some(queue);
        }
        self.advance().await;
        Ok(())
    }

    /// Spawn the current agent, or close out the queue if it is empty.
    /// Loops past any agent whose spawn fails to start at all.
    pub async fn advance(&self) {
        loop {
            let step = {
                let mut guard = self.queue.lock();
                let Some(queue) = guard.as_mut() else { return };
                match queue.status() {
                    StandupStatus::Finished => {
                        let session_id = queue.session_id().clone();
                        let completed = queue.completed().to_vec();
                        *guard = None;
                        Some(StandupStep::Finished(session_id, completed))
                    }
                    StandupStatus::Running => {
                        queue.current().map(|agent| StandupStep::Next(agent.clone(), queue.channel().to_string()))
                    }
                }
            };

            match step {
                None => return,
                Some(StandupStep::Finished(session_id, completed_agents)) => {
                    self.dispatcher
                        .bus()
                        .publish(Event::StandupSessionComplete { session_id, completed_agents }, self.dispatcher.clock());
                    return;
                }
                Some(StandupStep::Next(agent, channel)) => {
                    let ctx = PromptContext::new(TriggerReason::Standup, "standup", agent.to_string()).with_channel(channel.clone());
                    match self.dispatcher.trigger(&agent, ctx, standup_body(&channel)).await {
                        Ok(_) => return,
                        Err(err) => {
                            tracing::warn!(agent = %agent, error = %err, "standup spawn failed to start, advancing past it");
                            self.advance_past(&agent);
                        }
                    }
                }
            }
        }
    }

    fn advance_past(&self, agent: &AgentId) {
        let mut guard = self.queue.lock();
        if let Some(queue) = guard.as_mut() {
            if queue.current() == Some(agent) {
                queue.advance();
            }
        }
    }

    /// Called from the channel-append path for every posted message.
    #[instrument(skip(self, content))]
    pub async fn on_channel_message(&self, channel: &str, from: &AgentId, content: &str, timestamp_ms: u64) {
        let advanced = {
            let mut guard = self.queue.lock();
            let Some(queue) = guard.as_mut() else { return };
            if queue.on_channel_message(channel, from.as_str()) {
                Some(queue.session_id().clone())
            } else {
                None
            }
        };
        let Some(session_id) = advanced else { return };

        if let Ok(agent_session) = conclave_storage::get_session(self.dispatcher.pool(), from, self.dispatcher.clock().epoch_ms()).await {
            if let Err(err) =
                conclave_storage::post_standup(self.dispatcher.pool(), from, agent_session.as_str(), content, timestamp_ms).await
            {
                tracing::error!(agent = %from, error = %err, "failed to persist standup history");
            }
        }

        self.dispatcher.bus().publish(
            Event::StandupAgentComplete { session_id, agent_id: from.clone() },
            self.dispatcher.clock(),
        );
        self.advance().await;
    }
}

#[cfg(test)]
#[path = "standup_tests.rs"]
mod tests;
