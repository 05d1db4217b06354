//! Discord bot client abstraction.
//!
//! Provides login/teardown around serenity and the [`ChannelSink`]
//! implementation the dispatcher delivers through, hiding serenity details
//! from the rest of the application.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateAllowedMentions, CreateMessage, Ready};
use serenity::gateway::ShardManager;
use serenity::http::{Http, HttpError};
use serenity::prelude::*;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::controller::dispatcher::ChannelSink;

/// Signals the first Ready event so login can be awaited.
struct ReadyNotifier {
    ready_tx: Mutex<Option<oneshot::Sender<String>>>,
}

#[async_trait]
impl EventHandler for ReadyNotifier {
    async fn ready(&self, _context: Context, ready: Ready) {
        let tx = self.ready_tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = tx {
            let _ = tx.send(ready.user.name.clone());
        }
    }
}

/// A live, logged-in Discord connection.
pub struct ChatClient {
    http: Arc<Http>,
    shard_manager: Arc<ShardManager>,
    gateway: JoinHandle<Result<(), serenity::Error>>,
}

impl ChatClient {
    /// Log into Discord and wait for the gateway to become ready.
    pub async fn connect(token: &str) -> anyhow::Result<Self> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let (ready_tx, ready_rx) = oneshot::channel::<String>();
        let mut client = Client::builder(token, intents)
            .event_handler(ReadyNotifier {
                ready_tx: Mutex::new(Some(ready_tx)),
            })
            .await?;

        let http = client.http.clone();
        let shard_manager = client.shard_manager.clone();
        let mut gateway = tokio::spawn(async move { client.start().await });

        tokio::select! {
            ready = ready_rx => match ready {
                Ok(name) => {
                    info!("Logged into Discord as {}", name);
                    Ok(Self {
                        http,
                        shard_manager,
                        gateway,
                    })
                }
                Err(_) => {
                    anyhow::bail!("Discord gateway dropped before becoming ready");
                }
            },
            result = &mut gateway => {
                shard_manager.shutdown_all().await;
                match result {
                    Ok(Ok(())) => anyhow::bail!("Discord gateway ended before becoming ready"),
                    Ok(Err(e)) => Err(e.into()),
                    Err(e) => Err(e.into()),
                }
            },
            _ = tokio::time::sleep(Duration::from_secs(30)) => {
                shard_manager.shutdown_all().await;
                anyhow::bail!("Timed out waiting for Discord login");
            },
        }
    }

    pub fn http(&self) -> Arc<Http> {
        self.http.clone()
    }

    /// Tear the connection down, releasing live sockets. Must complete
    /// before a new client is created.
    pub async fn destroy(self) {
        self.shard_manager.shutdown_all().await;
        match tokio::time::timeout(Duration::from_secs(5), self.gateway).await {
            Ok(Ok(_)) => info!("Discord client shut down"),
            Ok(Err(e)) => warn!("Discord gateway task panicked: {}", e),
            Err(_) => warn!("Discord gateway shutdown timed out"),
        }
    }
}

/// Delivery sink the dispatcher sends through. Holds the HTTP handle of the
/// current connection, if any; swapped wholesale on every (re)connect.
#[derive(Clone, Default)]
pub struct DiscordSink {
    http: Arc<RwLock<Option<Arc<Http>>>>,
}

impl DiscordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_http(&self, http: Option<Arc<Http>>) {
        if let Ok(mut slot) = self.http.write() {
            *slot = http;
        }
    }

    fn current_http(&self) -> Option<Arc<Http>> {
        self.http.read().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl ChannelSink for DiscordSink {
    async fn deliver(&self, channel_id: u64, text: &str) -> DeliveryResult<()> {
        let Some(http) = self.current_http() else {
            return Err(DeliveryError::NotConnected);
        };

        // Empty allowed-mentions set: nothing in the text may resolve to a
        // live mention, on top of the sanitizer's zero-width separator.
        let builder = CreateMessage::new()
            .content(text)
            .allowed_mentions(CreateAllowedMentions::new());

        match ChannelId::new(channel_id).send_message(&http, builder).await {
            Ok(_) => Ok(()),
            Err(e) if is_unknown_channel(&e) => Err(DeliveryError::UnknownChannel { channel_id }),
            Err(e) => Err(DeliveryError::Send(e)),
        }
    }
}

/// Discord error 10003: the channel no longer exists.
fn is_unknown_channel(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.error.code == 10003
    )
}

/// Maintain the Discord connection across configuration changes.
///
/// A login failure leaves the relay offline until the next configuration
/// change; there is no retry backoff by design. The old client handle is
/// always released before a new one is created.
pub async fn run_connection(sink: DiscordSink, mut token_rx: watch::Receiver<String>) {
    let mut current: Option<ChatClient> = None;

    loop {
        let token = token_rx.borrow_and_update().clone();

        if let Some(client) = current.take() {
            sink.set_http(None);
            client.destroy().await;
        }

        if token.is_empty() {
            error!("Discord bot token not configured");
        } else {
            info!("Logging into Discord...");
            match ChatClient::connect(&token).await {
                Ok(client) => {
                    sink.set_http(Some(client.http()));
                    current = Some(client);
                }
                Err(e) => error!("Discord login error: {}", e),
            }
        }

        // Wait for an actual token change; reloads that keep the token are
        // no-ops.
        loop {
            if token_rx.changed().await.is_err() {
                if let Some(client) = current.take() {
                    sink.set_http(None);
                    client.destroy().await;
                }
                return;
            }
            if *token_rx.borrow() != token {
                info!("Discord bot token changed, reconnecting");
                break;
            }
        }
    }
}
