//! # Remote Command Protocol
//!
//! The control surface of the agent is a single store channel carrying
//! textual command tokens. This module defines the closed command
//! vocabulary, the prefix-match recognition rule, and response rendering.
//!
//! Recognition is deliberately prefix-based: a token like
//! `message-count-2026-01-01` still resolves to [`Command::MessageCount`],
//! and the *full* token names the result key, so callers can issue unique
//! tokens and collect their own responses.

use crate::core::state::MonitorState;

/// The fixed store channel the command handler subscribes to.
pub const COMMAND_CHANNEL: &str = "keywatch:command";

/// Prefix of the key/channel a command response is stored at and
/// published to. The full name is `RESULT_PREFIX` + the raw token.
pub const RESULT_PREFIX: &str = "keywatch:command:result:";

/// The closed set of recognized remote commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Report the total number of events observed so far.
    MessageCount,
    /// Report how many tracked keys are currently alive, as `alive/total`.
    TrackedKeys,
    /// Request a cooperative shutdown of the whole agent.
    Kill,
}

impl Command {
    /// Recognizes a command token by prefix. Unrecognized tokens yield
    /// `None` and are silently ignored by the handler.
    pub fn parse(token: &str) -> Option<Command> {
        if token.starts_with("message-count") {
            Some(Command::MessageCount)
        } else if token.starts_with("tracked-keys") {
            Some(Command::TrackedKeys)
        } else if token.starts_with("killkillkill") {
            Some(Command::Kill)
        } else {
            None
        }
    }
}

/// The key (and channel) a response for `token` is delivered under.
pub fn result_name(token: &str) -> String {
    format!("{RESULT_PREFIX}{token}")
}

/// Executes a recognized command against the shared state.
///
/// Returns the response text for commands that produce one. `Kill` flips
/// the shutdown flag and, like unrecognized tokens, produces no response.
pub fn execute(command: Command, state: &MonitorState, total: u64) -> Option<String> {
    match command {
        Command::MessageCount => Some(state.event_count().to_string()),
        Command::TrackedKeys => {
            let alive = total.saturating_sub(state.lost_count());
            Some(format!("{alive}/{total}"))
        }
        Command::Kill => {
            log::info!("Kill command! Shutting down...");
            state.request_shutdown();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_by_prefix() {
        assert_eq!(Command::parse("message-count"), Some(Command::MessageCount));
        assert_eq!(
            Command::parse("message-count-req-7"),
            Some(Command::MessageCount)
        );
        assert_eq!(Command::parse("tracked-keys"), Some(Command::TrackedKeys));
        assert_eq!(Command::parse("killkillkill"), Some(Command::Kill));
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("message"), None);
        assert_eq!(Command::parse("count-message"), None);
        assert_eq!(Command::parse("kill"), None);
    }

    #[test]
    fn test_message_count_response() {
        let state = MonitorState::new();
        for _ in 0..42 {
            state.record_event();
        }
        let resp = execute(Command::MessageCount, &state, 10);
        assert_eq!(resp.as_deref(), Some("42"));
    }

    #[test]
    fn test_tracked_keys_response() {
        let state = MonitorState::new();
        state.set_lost(2);
        let resp = execute(Command::TrackedKeys, &state, 10);
        assert_eq!(resp.as_deref(), Some("8/10"));
    }

    #[test]
    fn test_kill_sets_shutdown_and_stays_silent() {
        let state = MonitorState::new();
        let resp = execute(Command::Kill, &state, 10);
        assert_eq!(resp, None);
        assert!(state.shutdown_requested());
    }

    #[test]
    fn test_result_name_uses_full_token() {
        assert_eq!(
            result_name("message-count"),
            "keywatch:command:result:message-count"
        );
        assert_eq!(
            result_name("message-count-req-7"),
            "keywatch:command:result:message-count-req-7"
        );
    }
}
