//! Connection gate between the game output handler and the uplink.
//!
//! Two-state machine: while disconnected, qualifying output lines buffer in
//! the outbox; an observed Disconnected -> Connected edge drains them in
//! FIFO order. Repeated connect signals while already connected are no-ops.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::common::error::UplinkResult;
use crate::common::Action;
use crate::instance::outbox::Outbox;

/// Delivery seam toward the controller. Implemented over the live TCP
/// framing by the agent, and by a mock in tests.
#[async_trait]
pub trait UplinkSink: Send {
    async fn send(&mut self, action: Action, content: &str) -> UplinkResult<()>;
}

/// Uplink connectivity as observed by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Instance-side relay state: connection gate plus outbox.
#[derive(Debug)]
pub struct InstanceRelay {
    state: ConnectionState,
    outbox: Outbox,
}

impl Default for InstanceRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceRelay {
    /// Initial state is Disconnected.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            outbox: Outbox::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of buffered, not-yet-relayed items.
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Handle one qualifying game output line.
    ///
    /// Connected: attempt immediate delivery; a failure buffers the item and
    /// drops the gate to Disconnected so nothing is lost. Disconnected:
    /// append to the outbox tail.
    pub async fn on_output<S: UplinkSink + ?Sized>(
        &mut self,
        action: Action,
        content: String,
        sink: &mut S,
    ) {
        match self.state {
            ConnectionState::Connected => {
                if let Err(e) = sink.send(action, &content).await {
                    warn!("Uplink send failed, buffering message: {}", e);
                    self.outbox.push(action, content);
                    self.state = ConnectionState::Disconnected;
                }
            }
            ConnectionState::Disconnected => self.outbox.push(action, content),
        }
    }

    /// Observe a connect signal. Only a Disconnected -> Connected edge
    /// triggers a drain.
    pub async fn on_connect<S: UplinkSink + ?Sized>(&mut self, sink: &mut S) {
        if self.state == ConnectionState::Connected {
            return;
        }
        self.state = ConnectionState::Connected;

        if self.outbox.is_empty() {
            return;
        }
        let stats = self.outbox.drain(sink).await;
        info!(
            "Drained outbox: {} relayed, {} re-queued",
            stats.sent, stats.requeued
        );
    }

    /// Observe a disconnect signal. Future output buffers in the outbox.
    pub fn on_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashSet;

    use super::*;
    use crate::common::error::UplinkError;

    /// Records sends; fails the attempts whose zero-based index is listed.
    #[derive(Debug, Default)]
    pub struct MockSink {
        sent: Vec<(Action, String)>,
        fail_on: HashSet<usize>,
        attempts: usize,
    }

    impl MockSink {
        pub fn failing_on(attempts: impl IntoIterator<Item = usize>) -> Self {
            Self {
                fail_on: attempts.into_iter().collect(),
                ..Self::default()
            }
        }

        pub fn contents(&self) -> Vec<&str> {
            self.sent.iter().map(|(_, c)| c.as_str()).collect()
        }

        pub fn sent(&self) -> &[(Action, String)] {
            &self.sent
        }

        pub fn attempts(&self) -> usize {
            self.attempts
        }
    }

    #[async_trait]
    impl UplinkSink for MockSink {
        async fn send(&mut self, action: Action, content: &str) -> UplinkResult<()> {
            let attempt = self.attempts;
            self.attempts += 1;
            if self.fail_on.contains(&attempt) {
                return Err(UplinkError::Closed);
            }
            self.sent.push((action, content.to_string()));
            Ok(())
        }
    }
}
