//! Crier - relays game-server chat to Discord.
//!
//! Instance agents follow a game server's console output and ship chat
//! lines over a TCP uplink, surviving disconnects through an outbound
//! queue. The controller dispatches each relay event to the mapped Discord
//! channel, optionally augmented with machine translation.

mod common;
mod config;
mod controller;
mod discord;
mod instance;
mod translate;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use common::ActionEvent;
use config::env::get_config_path;
use config::load_and_validate;
use config::types::{Config, RelayConfig};
use controller::dispatcher::{Dispatcher, Translation};
use controller::resolver::ChannelResolver;
use controller::uplink::{run_listener, UplinkRegistry};
use discord::{run_connection, DiscordSink};
use translate::Translator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Crier v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Mapped instances: {}", config.discord.channels.len());
    if let Some(ref instance) = config.instance {
        info!("  Instance agent: {} -> {}", instance.name, instance.controller);
    }

    // Token changes (config reloads) feed the reconnect coordinator.
    let (token_tx, token_rx) = watch::channel(config.discord.token.clone());

    if let Some(relay) = config.relay.clone() {
        start_controller(&config, relay, token_rx).await;
    }

    if let Some(instance) = config.instance.clone() {
        tokio::spawn(instance::agent::run_agent(instance));
    }

    #[cfg(unix)]
    tokio::spawn(run_config_reload(config_path, token_tx));
    #[cfg(not(unix))]
    drop(token_tx);

    shutdown_signal().await;
    info!("Exiting...");
    Ok(())
}

/// Wire up and spawn the controller side: uplink listener, dispatcher pump
/// and the Discord connection coordinator.
async fn start_controller(config: &Config, relay: RelayConfig, token_rx: watch::Receiver<String>) {
    let registry = UplinkRegistry::new();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ActionEvent>();
    let sink = DiscordSink::new();

    let translation = match config.translate {
        Some(ref translate)
            if translate.is_enabled()
                && (translate.api_key.is_empty() || translate.target_languages().is_empty()) =>
        {
            warn!("Translation config is incomplete, continuing without translation");
            None
        }
        Some(ref translate) if translate.is_enabled() => {
            match Translator::init(&translate.url, &translate.api_key).await {
                Ok(translator) => Some(Translation {
                    translator,
                    targets: translate.target_languages(),
                }),
                Err(e) => {
                    error!("Failed to initialize translation service: {}", e);
                    warn!("Continuing without translation for this session");
                    None
                }
            }
        }
        _ => None,
    };

    let dispatcher = Dispatcher::new(
        sink.clone(),
        ChannelResolver::new(config.discord.channels.clone()),
        config.discord.datetime_on_message.unwrap_or(false),
        translation,
        registry.clone(),
    );

    let listen = relay.listen;
    let listener_registry = registry.clone();
    tokio::spawn(async move {
        if let Err(e) = run_listener(listen, events_tx, listener_registry).await {
            error!("Uplink listener failed: {}", e);
        }
    });

    // Events are handled strictly one at a time, preserving per-channel
    // ordering.
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            dispatcher.handle(event).await;
        }
        info!("Dispatcher ended");
    });

    tokio::spawn(run_connection(sink, token_rx));
}

/// Reload the config file on SIGHUP and publish the (possibly changed)
/// Discord token to the reconnect coordinator.
#[cfg(unix)]
async fn run_config_reload(config_path: String, token_tx: watch::Sender<String>) {
    let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to install SIGHUP handler: {}", e);
            return;
        }
    };

    while hangup.recv().await.is_some() {
        info!("SIGHUP received, reloading configuration");
        match load_and_validate(&config_path) {
            Ok(new_config) => {
                if token_tx.send(new_config.discord.token).is_err() {
                    break;
                }
            }
            Err(e) => error!("Config reload failed, keeping current config: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
