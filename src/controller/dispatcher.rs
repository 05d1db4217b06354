//! Per-event relay pipeline.
//!
//! One inbound relay event is fully processed (sanitize -> parse -> resolve
//! -> translate -> chunk -> deliver) before the next is taken, so ordering
//! toward any one Discord channel follows arrival order.

use async_trait::async_trait;
use chrono::Local;
use tracing::{error, warn};

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::{ActionEvent, ChatEvent};
use crate::controller::chunker::{chunk, MAX_MESSAGE_LENGTH};
use crate::controller::resolver::ChannelResolver;
use crate::controller::sanitize::sanitize;
use crate::controller::uplink::UplinkRegistry;
use crate::translate::Translator;

/// Delivery seam toward the chat platform. Implemented by the Discord
/// client; mocked in tests.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Deliver one segment to a channel with mention resolution disabled.
    async fn deliver(&self, channel_id: u64, text: &str) -> DeliveryResult<()>;
}

/// Translation configuration the dispatcher carries when the feature is on.
pub struct Translation {
    pub translator: Translator,
    pub targets: Vec<String>,
}

/// Orchestrates delivery of inbound relay events.
pub struct Dispatcher<S> {
    sink: S,
    resolver: ChannelResolver,
    datetime_on_message: bool,
    translation: Option<Translation>,
    back_relay: UplinkRegistry,
}

impl<S: ChannelSink> Dispatcher<S> {
    pub fn new(
        sink: S,
        resolver: ChannelResolver,
        datetime_on_message: bool,
        translation: Option<Translation>,
        back_relay: UplinkRegistry,
    ) -> Self {
        Self {
            sink,
            resolver,
            datetime_on_message,
            translation,
            back_relay,
        }
    }

    /// Handle one inbound relay event.
    pub async fn handle(&self, event: ActionEvent) {
        // Non-chat actions are not relayed; no log, they are routine.
        if !event.action.is_relayed() {
            return;
        }

        let sanitized = sanitize(&event.content);
        let (username, message) = parse_user_message(&sanitized);

        // Unmapped instances are intentionally not relayed.
        let Some(channel_id) = self.resolver.resolve(&event.instance_name) else {
            return;
        };

        self.deliver(channel_id, &format_line(username, message))
            .await;

        if let Some(ref translation) = self.translation {
            let result = translation
                .translator
                .translate(message, &translation.targets)
                .await;
            if result.action {
                let joined = result.passages.join("\n");
                self.deliver(channel_id, &format_line(username, &joined))
                    .await;
                self.relay_back(&event.instance_name, username, &joined);
            }
        }
    }

    /// Timestamp, chunk and send one formatted message. Failures drop the
    /// message; there is no retry at this layer.
    async fn deliver(&self, channel_id: u64, text: &str) {
        let text = if self.datetime_on_message {
            format!("{} {}", Local::now().format("%Y%m%d %H%M%S"), text)
        } else {
            text.to_string()
        };

        for segment in chunk(&text, MAX_MESSAGE_LENGTH) {
            match self.sink.deliver(channel_id, segment).await {
                Ok(()) => {}
                Err(DeliveryError::UnknownChannel { .. }) => {
                    // Channel was deleted; not worth more than a warning.
                    warn!("Discord channel {} not found, dropping message", channel_id);
                    return;
                }
                Err(e) => {
                    error!("Failed to deliver to channel {}: {}", channel_id, e);
                    return;
                }
            }
        }
    }

    /// Push translated text back toward the originating instance.
    fn relay_back(&self, instance_name: &str, username: &str, joined: &str) {
        let content = format!("[color=255,255,255]`{}`: {}[/color]", username, joined);
        self.back_relay.send_to(ChatEvent {
            instance_name: instance_name.to_string(),
            content,
        });
    }
}

/// Outgoing Discord format for one chat line.
fn format_line(username: &str, message: &str) -> String {
    format!("**`{}`**: {}", username, message)
}

/// Split sanitized content at the first `:` into username and trimmed
/// message. Without a colon the whole string is the username and the
/// message is empty; that leniency is deliberate.
pub fn parse_user_message(content: &str) -> (&str, &str) {
    match content.split_once(':') {
        Some((username, message)) => (username, message.trim()),
        None => (content, ""),
    }
}
