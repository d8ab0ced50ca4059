// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out.
//!
//! Publishing is built on a single `tokio::sync::broadcast` channel: cheap,
//! non-blocking from the publisher's side, and every subscriber gets its own
//! ring buffer so one subscriber falling behind does not affect another.
//! Production consumers (the WebSocket sink, out of this crate's scope) are
//! expected to go through [`EventBus::subscribe_mailbox`] rather than the raw
//! broadcast receiver: the mailbox adds a second, explicitly bounded buffer
//! in front of the consumer's own pull rate, so a slow HTTP write doesn't
//! force the broadcast ring itself to grow or lag other subscribers.

use conclave_core::{Clock, Event, EventEnvelope};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish `event`, stamping it with the current time from `clock`. A
    /// send with no active receivers is not an error: the bus has no
    /// subscribers at all in that moment, which is normal at startup.
    pub fn publish(&self, event: Event, clock: &impl Clock) {
        let envelope = EventEnvelope::new(event, clock.epoch_ms());
        let _ = self.tx.send(envelope);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Raw broadcast subscription, for tests and in-process consumers that
    /// want to handle `Lagged` themselves.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Subscribe via a bounded [`Mailbox`]: a background task drains the
    /// broadcast receiver and pushes into a capacity-`capacity` queue,
    /// dropping the oldest queued frame (and counting the drop) when full,
    /// rather than ever blocking the forwarding task or the publisher.
    pub fn subscribe_mailbox(&self, capacity: usize) -> Mailbox {
        let mailbox = Mailbox::new(capacity);
        let sink = mailbox.clone();
        let mut rx = self.tx.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => sink.push(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "mailbox forwarder lagged behind the broadcast channel");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        sink.close();
                        break;
                    }
                }
            }
        });
        mailbox
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

struct MailboxInner {
    queue: Mutex<VecDeque<EventEnvelope>>,
    capacity: usize,
    dropped: AtomicU64,
    closed: AtomicBool,
    notify: tokio::sync::Notify,
}

/// A bounded, drop-oldest-when-full queue of events for a single subscriber.
#[derive(Clone)]
pub struct Mailbox {
    inner: Arc<MailboxInner>,
}

impl Mailbox {
    fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                queue: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                dropped: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    fn push(&self, event: EventEnvelope) {
        let mut queue = self.inner.queue.lock();
        if queue.len() >= self.inner.capacity {
            queue.pop_front();
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(event);
        drop(queue);
        self.inner.notify.notify_one();
    }

    fn close(&self) {
        self.inner.closed.store(true, Ordering::Relaxed);
        self.inner.notify.notify_one();
    }

    /// Wait for and return the next event, or `None` once the upstream
    /// broadcast channel has closed and the mailbox has drained.
    pub async fn recv(&self) -> Option<EventEnvelope> {
        loop {
            {
                let mut queue = self.inner.queue.lock();
                if let Some(event) = queue.pop_front() {
                    return Some(event);
                }
                if self.inner.closed.load(Ordering::Relaxed) {
                    return None;
                }
            }
            self.inner.notify.notified().await;
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
