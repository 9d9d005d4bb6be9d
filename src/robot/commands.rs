//! Command text parsing and the structured reply sent back to the client.
//!
//! Incoming text is matched against an ordered list of shapes (JSON object,
//! `action: name` / `action=name`, bare name). The first shape that yields an
//! action name wins.
extern crate alloc;

use alloc::string::{String, ToString};
use core::fmt::Display;
use serde::{Deserialize, Serialize};

const ACTION_KEY: &str = "action";

/// Returns the action name a matcher found in the lowercased, trimmed text.
type Matcher = fn(&str) -> Option<String>;

const MATCHERS: [Matcher; 3] = [json_action, key_value_action, bare_action];

/// Extracts the action name from a command message.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_action(message: &str) -> Result<String, CommandError> {
    let message = message.trim().to_ascii_lowercase();
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(&message))
        .ok_or(CommandError::NoAction)
}

#[derive(Deserialize)]
struct ActionEnvelope {
    action: String,
}

/// `{"action": "name"}`, also with single-quoted keys and values, or embedded
/// in a larger object.
fn json_action(message: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ActionEnvelope>(message) {
        let action = envelope.action.trim();
        if !action.is_empty() {
            return Some(action.to_string());
        }
    }
    quoted_action(message, '"').or_else(|| quoted_action(message, '\''))
}

/// Finds `<q>action<q> : <q>value<q>` anywhere in the message.
fn quoted_action(message: &str, quote: char) -> Option<String> {
    let mut key = String::with_capacity(ACTION_KEY.len() + 2);
    key.push(quote);
    key.push_str(ACTION_KEY);
    key.push(quote);

    message.match_indices(key.as_str()).find_map(|(at, _)| {
        let rest = message[at + key.len()..].trim_start();
        let rest = rest.strip_prefix(':')?.trim_start();
        let value = rest.strip_prefix(quote)?;
        let end = value.find(quote)?;
        let name = value[..end].trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// `action: name` or `action=name` anywhere in the message. The `:` form is
/// searched across the whole message before the `=` form.
fn key_value_action(message: &str) -> Option<String> {
    [':', '='].into_iter().find_map(|separator| {
        message.match_indices(ACTION_KEY).find_map(|(at, _)| {
            let rest = message[at + ACTION_KEY.len()..]
                .trim_start()
                .strip_prefix(separator)?
                .trim_start();
            let name: String = rest.chars().take_while(|c| is_action_char(*c)).collect();
            (!name.is_empty()).then_some(name)
        })
    })
}

/// The whole message is the action name.
fn bare_action(message: &str) -> Option<String> {
    (!message.is_empty() && message.chars().all(is_action_char)).then(|| message.to_string())
}

fn is_action_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The payload was not valid UTF-8.
    InvalidEncoding,
    /// No action could be extracted from the text.
    NoAction,
    /// The action name is not in the gesture library.
    UnknownAction { action: String, available: String },
}

impl Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::InvalidEncoding => f.write_str("Invalid UTF-8 data received"),
            CommandError::NoAction => f.write_str("No valid action found in message"),
            CommandError::UnknownAction { action, available } => {
                write!(f, "Unknown action: {action}. Available actions: {available}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Reply to one command, serialized as a single JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub message: String,
}

impl CommandResult {
    pub fn success(action: &str, message: &str) -> Self {
        Self {
            status: Status::Success,
            action: Some(action.to_string()),
            message: message.to_string(),
        }
    }

    pub fn error(message: impl Display) -> Self {
        Self {
            status: Status::Error,
            action: None,
            message: message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings into a String cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<CommandError> for CommandResult {
    fn from(err: CommandError) -> Self {
        CommandResult::error(err)
    }
}
