//! Instance-side relay: follows a game server's console output and ships
//! chat lines to the controller, buffering while the uplink is down.

pub mod agent;
pub mod outbox;
pub mod output;
pub mod relay;
