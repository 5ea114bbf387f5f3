//! odds-core: session manager for "What are the odds?" challenges.
//!
//! A challenger proposes a wager to a target; the target accepts or
//! declines; both then submit a private pick. Games live in memory only and
//! expire on a timer if they stall.

pub mod challenge;
pub mod custom_id;
pub mod error;
pub mod game;

// Re-export commonly used items at crate root.
pub use challenge::{validate_challenge, ChallengeError, ChallengeLimits};
pub use custom_id::{Action, CustomId, CustomIdError};
pub use error::{GameError, GameResult};
pub use game::{ExpireReason, GameManager, GameStatus, NewGame, PickOutcome, Scope, Session};
