//! Correlation tokens carried by buttons and modals.
//!
//! Format: `odds:<action>:<game_id>`. Game ids are hex, so they never
//! contain the `:` separator.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "odds";

/// Which interaction a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accept,
    Decline,
    /// Open the pick dialog.
    Enter,
    /// Pick dialog submission.
    Submit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Decline => "decline",
            Action::Enter => "enter",
            Action::Submit => "submit",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(Action::Accept),
            "decline" => Some(Action::Decline),
            "enter" => Some(Action::Enter),
            "submit" => Some(Action::Submit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomIdError {
    #[error("not an odds token: {0}")]
    Prefix(String),

    #[error("unknown action: {0}")]
    Action(String),

    #[error("missing game id")]
    MissingGameId,
}

/// A decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomId {
    pub action: Action,
    pub game_id: String,
}

impl CustomId {
    pub fn new(action: Action, game_id: impl Into<String>) -> Self {
        Self {
            action,
            game_id: game_id.into(),
        }
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}:{}:{}", self.action.as_str(), self.game_id)
    }
}

impl FromStr for CustomId {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let prefix = parts.next().unwrap_or_default();
        if prefix != PREFIX {
            return Err(CustomIdError::Prefix(prefix.to_string()));
        }
        let action_raw = parts.next().unwrap_or_default();
        let action =
            Action::parse(action_raw).ok_or_else(|| CustomIdError::Action(action_raw.to_string()))?;
        let game_id = parts.next().unwrap_or_default();
        if game_id.is_empty() {
            return Err(CustomIdError::MissingGameId);
        }
        Ok(Self::new(action, game_id))
    }
}
