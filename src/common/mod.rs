//! Shared types and errors used by both sides of the relay.

pub mod error;
pub mod messages;

pub use messages::{Action, ActionEvent, ChatEvent, UplinkMessage};
