//! Discord client lifecycle and delivery sink.

pub mod client;

pub use client::{run_connection, ChatClient, DiscordSink};
