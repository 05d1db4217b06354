//! Game console output parsing.
//!
//! The game server prints one line per event, with the event kind in square
//! brackets, optionally preceded by a timestamp:
//!
//! ```text
//! 2026-08-23 12:00:01 [CHAT] Alice: hello there
//! 2026-08-23 12:00:05 [SHOUT] Bob: over here!
//! 2026-08-23 12:00:09 [JOIN] Carol joined the game
//! ```
//!
//! Every bracketed line becomes an action; the controller decides which
//! action kinds are relayed. Lines without a bracketed tag are ordinary log
//! output and are ignored.

use crate::common::Action;

/// Parse one console line into an action and its content.
///
/// Returns `None` for lines that carry no bracketed event tag.
pub fn parse_output_line(line: &str) -> Option<(Action, String)> {
    let start = line.find('[')?;
    let end = line[start..].find(']')? + start;
    let tag = &line[start + 1..end];

    // Event tags are short and upper-case; anything else (say, a bracketed
    // mod name deep in a log line) is not an output event.
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_uppercase() || c == '-') {
        return None;
    }

    let action = match tag {
        "CHAT" => Action::Chat,
        "SHOUT" => Action::Shout,
        _ => Action::Other,
    };
    let content = line[end + 1..].trim();

    Some((action, content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_line() {
        let parsed = parse_output_line("2026-08-23 12:00:01 [CHAT] Alice: hello there");
        assert_eq!(
            parsed,
            Some((Action::Chat, "Alice: hello there".to_string()))
        );
    }

    #[test]
    fn test_shout_line() {
        let parsed = parse_output_line("[SHOUT] Bob: over here!");
        assert_eq!(parsed, Some((Action::Shout, "Bob: over here!".to_string())));
    }

    #[test]
    fn test_other_event_still_parses() {
        // Non-chat actions are relayed as-is; the controller drops them.
        let parsed = parse_output_line("[JOIN] Carol joined the game");
        assert_eq!(
            parsed,
            Some((Action::Other, "Carol joined the game".to_string()))
        );
    }

    #[test]
    fn test_plain_log_line_ignored() {
        assert_eq!(parse_output_line("Loading map chunk 12,7"), None);
        assert_eq!(parse_output_line(""), None);
    }

    #[test]
    fn test_lowercase_bracket_ignored() {
        assert_eq!(parse_output_line("Loaded [base-mod] in 0.2s"), None);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(parse_output_line("[CHAT]"), Some((Action::Chat, String::new())));
    }
}
