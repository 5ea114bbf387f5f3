//! The game record handed out by the manager.

use std::fmt;
use tokio::time::Instant;

/// Namespace in which target locking applies: one server channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub guild_id: String,
    pub channel_id: String,
}

impl Scope {
    pub fn new(guild_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.guild_id, self.channel_id)
    }
}

/// Where a game is in its lifecycle. Resolved games are removed, not marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting for the target to accept or decline.
    Pending,
    /// Accepted; waiting for both picks.
    Active,
}

/// Why a game was expired, derived from its status when the timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireReason {
    /// The challenge was never accepted.
    Pending,
    /// Accepted, but both picks never arrived.
    Active,
}

impl ExpireReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpireReason::Pending => "pending",
            ExpireReason::Active => "active",
        }
    }
}

impl From<GameStatus> for ExpireReason {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Pending => ExpireReason::Pending,
            GameStatus::Active => ExpireReason::Active,
        }
    }
}

impl fmt::Display for ExpireReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one challenge.
///
/// The manager owns the authoritative copy; everything it returns is a clone,
/// so holding on to a `Session` never keeps the game alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque identifier, 32 lowercase hex characters.
    pub id: String,
    pub scope: Scope,
    pub challenger_id: String,
    pub target_id: String,
    /// Upper bound for picks; valid picks are `1..=max`.
    pub max: u32,
    pub prompt: String,
    pub status: GameStatus,
    pub challenger_pick: Option<u32>,
    pub target_pick: Option<u32>,
    /// Platform message that announced the challenge, once posted.
    pub challenge_message_id: Option<String>,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Session {
    pub fn is_player(&self, user_id: &str) -> bool {
        user_id == self.challenger_id || user_id == self.target_id
    }

    /// Both pick slots are filled.
    pub fn is_complete(&self) -> bool {
        self.challenger_pick.is_some() && self.target_pick.is_some()
    }

    pub fn is_matched(&self) -> bool {
        match (self.challenger_pick, self.target_pick) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn lock_key(&self) -> LockKey {
        LockKey::new(&self.scope, &self.target_id)
    }
}

/// Key of the lock table: one entry per (scope, target).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct LockKey {
    scope: Scope,
    target_id: String,
}

impl LockKey {
    pub(crate) fn new(scope: &Scope, target_id: &str) -> Self {
        Self {
            scope: scope.clone(),
            target_id: target_id.to_string(),
        }
    }
}
