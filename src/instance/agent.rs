//! Instance agent: uplink client and console follower.
//!
//! Reads the game server's console output from stdin, relays bracketed
//! events to the controller over a newline-delimited JSON TCP uplink, and
//! prints translated text pushed back by the controller so the host wrapper
//! can feed it to the game console.

use std::time::Duration;

use async_trait::async_trait;
use backon::BackoffBuilder;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::common::error::{UplinkError, UplinkResult};
use crate::common::{Action, ActionEvent, UplinkMessage};
use crate::config::types::InstanceConfig;
use crate::instance::output::parse_output_line;
use crate::instance::relay::{InstanceRelay, UplinkSink};

/// Write half of a live uplink connection, framing relay events as JSON
/// lines on behalf of one named instance.
struct FramedUplink {
    instance_name: String,
    writer: SplitSink<Framed<TcpStream, LinesCodec>, String>,
}

#[async_trait]
impl UplinkSink for FramedUplink {
    async fn send(&mut self, action: Action, content: &str) -> UplinkResult<()> {
        let message =
            UplinkMessage::Action(ActionEvent::new(self.instance_name.clone(), action, content));
        let line = serde_json::to_string(&message)?;
        self.writer.send(line).await?;
        Ok(())
    }
}

/// Exponential backoff iterator for uplink reconnection.
/// 1s initial, 60s max, factor 2, with jitter, unlimited retries.
fn uplink_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(60))
        .with_factor(2.0)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Run the instance agent until the console stream ends.
pub async fn run_agent(config: InstanceConfig) {
    let mut relay = InstanceRelay::new();
    let mut console = BufReader::new(tokio::io::stdin()).lines();
    let mut backoff = uplink_backoff();

    loop {
        match TcpStream::connect(&config.controller).await {
            Ok(stream) => {
                info!("Uplink connected to {}", config.controller);
                backoff = uplink_backoff();

                if run_session(&config, &mut relay, &mut console, stream).await {
                    // Console stream ended; nothing left to relay.
                    return;
                }
                relay.on_disconnect();
                warn!(
                    "Uplink lost, buffering output ({} queued)",
                    relay.queued()
                );
            }
            Err(e) => {
                let error = UplinkError::ConnectFailed {
                    addr: config.controller.clone(),
                    source: e,
                };
                warn!("{}", error);
            }
        }

        let delay = backoff.next().unwrap_or(Duration::from_secs(60));
        debug!("Reconnecting uplink in {:.1}s", delay.as_secs_f64());
        sleep(delay).await;
    }
}

/// Drive one connected session. Returns true when the console stream has
/// ended and the agent should stop, false on uplink loss.
async fn run_session(
    config: &InstanceConfig,
    relay: &mut InstanceRelay,
    console: &mut Lines<BufReader<Stdin>>,
    stream: TcpStream,
) -> bool {
    let framed = Framed::new(stream, LinesCodec::new());
    let (writer, mut reader) = framed.split();
    let mut sink = FramedUplink {
        instance_name: config.name.clone(),
        writer,
    };

    relay.on_connect(&mut sink).await;

    loop {
        tokio::select! {
            line = console.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some((action, content)) = parse_output_line(&line) {
                        relay.on_output(action, content, &mut sink).await;
                    }
                }
                Ok(None) => {
                    info!("Console stream ended, stopping instance agent");
                    return true;
                }
                Err(e) => {
                    error!("Failed to read console output: {}", e);
                    return true;
                }
            },
            frame = reader.next() => match frame {
                Some(Ok(line)) => handle_controller_line(&config.name, &line),
                Some(Err(e)) => {
                    warn!("Uplink read error: {}", e);
                    return false;
                }
                None => {
                    warn!("{}", UplinkError::Closed);
                    return false;
                }
            },
        }
    }
}

/// Handle one line pushed by the controller (translated chat).
fn handle_controller_line(instance_name: &str, line: &str) {
    match serde_json::from_str::<UplinkMessage>(line) {
        Ok(UplinkMessage::Chat(chat)) => {
            if chat.instance_name == instance_name {
                // Stdout is the channel back to the game console; the host
                // wrapper forwards it as an in-game print.
                println!("{}", chat.content);
            } else {
                debug!(
                    "Ignoring chat event addressed to '{}'",
                    chat.instance_name
                );
            }
        }
        Ok(UplinkMessage::Action(_)) => {
            debug!("Ignoring unexpected relay event from controller");
        }
        Err(e) => warn!("Malformed message from controller: {}", e),
    }
}
