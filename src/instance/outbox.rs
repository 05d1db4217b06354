//! Outbound queue of not-yet-relayed events.
//!
//! Holds chat lines produced while the uplink to the controller is down.
//! Insertion order is the delivery order contract. A drain attempts every
//! item present at drain start exactly once; failures are re-appended to
//! the tail and left for the next connect edge, so the queue is never
//! mutated while being iterated.

use std::collections::VecDeque;

use tracing::warn;

use crate::common::Action;
use crate::instance::relay::UplinkSink;

/// One buffered chat line, owned exclusively by the queue of the instance
/// that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub action: Action,
    pub content: String,
}

/// Outcome of a single drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainStats {
    /// Items delivered to the uplink.
    pub sent: usize,
    /// Items whose delivery failed and were re-appended to the tail.
    pub requeued: usize,
}

/// FIFO buffer of events awaiting relay. Unbounded.
#[derive(Debug, Default)]
pub struct Outbox {
    items: VecDeque<QueueItem>,
}

impl Outbox {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append an item to the tail.
    pub fn push(&mut self, action: Action, content: impl Into<String>) {
        self.items.push_back(QueueItem {
            action,
            content: content.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Attempt delivery of every queued item, strictly in FIFO order.
    ///
    /// Each item present at drain start is attempted exactly once. A failed
    /// item is re-appended to the tail rather than retried in place, so a
    /// single bad item never blocks the drain. Items re-enqueued during the
    /// drain are left for the next connect edge.
    pub async fn drain<S: UplinkSink + ?Sized>(&mut self, sink: &mut S) -> DrainStats {
        let pending = self.items.len();
        let mut stats = DrainStats::default();

        for _ in 0..pending {
            let Some(item) = self.items.pop_front() else {
                break;
            };
            match sink.send(item.action, &item.content).await {
                Ok(()) => stats.sent += 1,
                Err(e) => {
                    warn!("Failed to relay queued message, re-queueing: {}", e);
                    self.items.push_back(item);
                    stats.requeued += 1;
                }
            }
        }

        stats
    }
}
