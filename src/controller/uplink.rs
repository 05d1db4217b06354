//! Uplink listener: accepts instance agents and pumps their relay events
//! into the dispatcher.
//!
//! One TCP connection per instance agent, newline-delimited JSON both ways.
//! The registry tracks which connection serves which instance so translated
//! text can be pushed back toward its origin.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, warn};

use crate::common::error::UplinkResult;
use crate::common::{ActionEvent, ChatEvent, UplinkMessage};

/// Maps instance names to the back-relay sender of their live connection.
///
/// The lock is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct UplinkRegistry {
    inner: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<ChatEvent>>>>,
}

impl UplinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, instance_name: String, tx: mpsc::UnboundedSender<ChatEvent>) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(instance_name, tx);
        }
    }

    fn unregister(&self, instance_name: &str) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(instance_name);
        }
    }

    /// Push a chat event toward its instance. Returns false when the
    /// instance has no live uplink; the event is simply dropped.
    pub fn send_to(&self, event: ChatEvent) -> bool {
        let Ok(map) = self.inner.lock() else {
            return false;
        };
        match map.get(&event.instance_name) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    #[cfg(test)]
    pub fn register_for_test(&self, instance_name: &str, tx: mpsc::UnboundedSender<ChatEvent>) {
        self.register(instance_name.to_string(), tx);
    }
}

/// Accept uplink connections forever.
pub async fn run_listener(
    listen: String,
    events_tx: mpsc::UnboundedSender<ActionEvent>,
    registry: UplinkRegistry,
) -> UplinkResult<()> {
    let listener = TcpListener::bind(&listen).await?;
    info!("Uplink listener on {}", listen);

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("Uplink connection from {}", peer);
        let events_tx = events_tx.clone();
        let registry = registry.clone();
        tokio::spawn(async move {
            handle_connection(stream, events_tx, registry).await;
        });
    }
}

/// Drive one instance connection until it closes.
async fn handle_connection(
    stream: TcpStream,
    events_tx: mpsc::UnboundedSender<ActionEvent>,
    registry: UplinkRegistry,
) {
    let framed = Framed::new(stream, LinesCodec::new());
    let (mut writer, mut reader) = framed.split();
    let (chat_tx, mut chat_rx) = mpsc::unbounded_channel::<ChatEvent>();
    let mut registered: Option<String> = None;

    loop {
        tokio::select! {
            frame = reader.next() => match frame {
                Some(Ok(line)) => match serde_json::from_str::<UplinkMessage>(&line) {
                    Ok(UplinkMessage::Action(event)) => {
                        // The first event names the instance this connection
                        // serves; track it for the back-relay.
                        if registered.as_deref() != Some(event.instance_name.as_str()) {
                            if let Some(ref old) = registered {
                                registry.unregister(old);
                            }
                            registry.register(event.instance_name.clone(), chat_tx.clone());
                            registered = Some(event.instance_name.clone());
                        }
                        if events_tx.send(event).is_err() {
                            debug!("Dispatcher gone, closing uplink connection");
                            break;
                        }
                    }
                    Ok(UplinkMessage::Chat(_)) => {
                        debug!("Ignoring unexpected chat event from instance");
                    }
                    Err(e) => warn!("Malformed relay event: {}", e),
                },
                Some(Err(e)) => {
                    warn!("Uplink read error: {}", e);
                    break;
                }
                None => break,
            },
            chat = chat_rx.recv() => {
                // Registry sender lives as long as this task; recv only
                // yields None once chat_tx is dropped on shutdown.
                let Some(chat) = chat else { break; };
                match serde_json::to_string(&UplinkMessage::Chat(chat)) {
                    Ok(line) => {
                        if let Err(e) = writer.send(line).await {
                            warn!("Uplink write error: {}", e);
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to encode chat event: {}", e),
                }
            },
        }
    }

    if let Some(name) = registered {
        registry.unregister(&name);
        info!("Instance '{}' disconnected", name);
    }
}
