//! Canonical message types for the relay.
//!
//! This module defines the single source of truth for the messages carried
//! over the uplink between an instance agent and the controller.

use serde::{Deserialize, Serialize};

/// The kind of chat line a game instance produced.
///
/// Anything that is not `Chat` or `Shout` is carried as `Other` and dropped
/// by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Chat,
    Shout,
    #[serde(other)]
    Other,
}

impl Action {
    /// True for the action kinds the dispatcher relays to Discord.
    pub fn is_relayed(self) -> bool {
        matches!(self, Action::Chat | Action::Shout)
    }
}

/// One in-game chat/shout line, sent from an instance toward the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    pub instance_name: String,
    pub action: Action,
    pub content: String,
}

impl ActionEvent {
    pub fn new(
        instance_name: impl Into<String>,
        action: Action,
        content: impl Into<String>,
    ) -> Self {
        Self {
            instance_name: instance_name.into(),
            action,
            content: content.into(),
        }
    }
}

/// Text pushed from the controller back toward an instance's game console
/// (translated passages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    pub instance_name: String,
    pub content: String,
}

/// Envelope for everything that travels over the uplink, one JSON object
/// per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UplinkMessage {
    /// Instance -> controller relay event.
    Action(ActionEvent),
    /// Controller -> instance translated text.
    Chat(ChatEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_event_wire_format() {
        let event = ActionEvent::new("S1", Action::Chat, "Alice: hi");
        let json = serde_json::to_string(&UplinkMessage::Action(event)).unwrap();

        assert!(json.contains("\"type\":\"action\""));
        assert!(json.contains("\"instanceName\":\"S1\""));
        assert!(json.contains("\"action\":\"CHAT\""));
        assert!(json.contains("\"content\":\"Alice: hi\""));
    }

    #[test]
    fn test_action_round_trip() {
        let json = r#"{"type":"action","instanceName":"S2","action":"SHOUT","content":"Bob: hey"}"#;
        let msg: UplinkMessage = serde_json::from_str(json).unwrap();

        assert_eq!(
            msg,
            UplinkMessage::Action(ActionEvent::new("S2", Action::Shout, "Bob: hey"))
        );
    }

    #[test]
    fn test_unknown_action_parses_as_other() {
        let json = r#"{"instanceName":"S1","action":"JOIN","content":"Alice joined"}"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.action, Action::Other);
        assert!(!event.action.is_relayed());
    }

    #[test]
    fn test_relayed_actions() {
        assert!(Action::Chat.is_relayed());
        assert!(Action::Shout.is_relayed());
        assert!(!Action::Other.is_relayed());
    }
}
