//! Challenge games: the record type and the manager that owns them.

pub mod manager;
pub mod session;

pub use manager::{ExpireCallback, GameManager, NewGame, PickOutcome};
pub use session::{ExpireReason, GameStatus, Scope, Session};
