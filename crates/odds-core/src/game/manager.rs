//! Game lifecycle management.
//!
//! Tracks every unresolved challenge, enforces one game per target per
//! channel, and expires stalled games on a per-game timer.

use super::session::{ExpireReason, GameStatus, LockKey, Scope, Session};
use crate::error::{GameError, GameResult};
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Called once per expired game, after the game has been removed.
pub type ExpireCallback =
    Arc<dyn Fn(Session, ExpireReason) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Input for [`GameManager::create_game`].
#[derive(Debug, Clone)]
pub struct NewGame {
    pub scope: Scope,
    pub challenger_id: String,
    pub target_id: String,
    pub max: u32,
    pub prompt: String,
}

/// Result of a successful [`GameManager::submit_pick`].
#[derive(Debug, Clone)]
pub struct PickOutcome {
    pub session: Session,
    /// Both players have now picked; the game has been removed.
    pub is_complete: bool,
    /// Complete and both picks are equal.
    pub matched: bool,
}

struct Entry {
    session: Session,
    timer: JoinHandle<()>,
}

/// Session store and lock table. Always mutated together under one mutex.
#[derive(Default)]
struct State {
    games: HashMap<String, Entry>,
    locks: HashMap<LockKey, String>,
}

impl State {
    /// Remove a game and its lock entry. The timer is left to the caller.
    fn remove(&mut self, game_id: &str) -> Option<Entry> {
        let entry = self.games.remove(game_id)?;
        self.locks.remove(&entry.session.lock_key());
        Some(entry)
    }

    /// Remove a game on a non-expiry path, cancelling its timer.
    fn remove_and_cancel(&mut self, game_id: &str) -> Option<Session> {
        let entry = self.remove(game_id)?;
        entry.timer.abort();
        Some(entry.session)
    }
}

impl Drop for State {
    fn drop(&mut self) {
        for entry in self.games.values() {
            entry.timer.abort();
        }
    }
}

struct Shared {
    state: Mutex<State>,
    timeout: Duration,
    on_expire: ExpireCallback,
}

/// Manages all unresolved games.
///
/// Cloning is cheap and every clone sees the same games.
#[derive(Clone)]
pub struct GameManager {
    shared: Arc<Shared>,
}

impl GameManager {
    /// Create a manager whose games expire `timeout` after creation.
    pub fn new<F, Fut>(timeout: Duration, on_expire: F) -> Self
    where
        F: Fn(Session, ExpireReason) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let on_expire: ExpireCallback =
            Arc::new(move |session, reason| on_expire(session, reason).boxed());
        Self::with_callback(timeout, on_expire)
    }

    pub fn with_callback(timeout: Duration, on_expire: ExpireCallback) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                timeout,
                on_expire,
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }

    /// Start a new pending game and arm its expiry timer.
    ///
    /// Fails with [`GameError::LockConflict`] if the target already has an
    /// unresolved game in the same scope.
    pub async fn create_game(&self, input: NewGame) -> GameResult<Session> {
        let lock_key = LockKey::new(&input.scope, &input.target_id);
        let mut state = self.shared.state.lock().await;
        if state.locks.contains_key(&lock_key) {
            debug!(scope = %input.scope, target = %input.target_id, "target already locked");
            return Err(GameError::LockConflict);
        }

        let game_id = generate_game_id();
        let created_at = Instant::now();
        let expires_at = created_at + self.shared.timeout;
        let session = Session {
            id: game_id.clone(),
            scope: input.scope,
            challenger_id: input.challenger_id,
            target_id: input.target_id,
            max: input.max,
            prompt: input.prompt,
            status: GameStatus::Pending,
            challenger_pick: None,
            target_pick: None,
            challenge_message_id: None,
            created_at,
            expires_at,
        };

        // The timer cannot observe the game before it is inserted: expiry
        // needs the state lock, which is held until this function returns.
        let timer = tokio::spawn(run_expiry_timer(
            Arc::downgrade(&self.shared),
            game_id.clone(),
            expires_at,
        ));

        state.locks.insert(lock_key, game_id.clone());
        state.games.insert(
            game_id.clone(),
            Entry {
                session: session.clone(),
                timer,
            },
        );

        info!(
            game_id = %game_id,
            scope = %session.scope,
            challenger = %session.challenger_id,
            target = %session.target_id,
            max = session.max,
            "game created"
        );
        Ok(session)
    }

    /// Snapshot of a live game.
    pub async fn get_game(&self, game_id: &str) -> Option<Session> {
        let state = self.shared.state.lock().await;
        state.games.get(game_id).map(|entry| entry.session.clone())
    }

    /// Record the platform message that announced the challenge.
    pub async fn set_challenge_message(&self, game_id: &str, message_id: String) -> GameResult<()> {
        let mut state = self.shared.state.lock().await;
        let entry = state.games.get_mut(game_id).ok_or(GameError::NotFound)?;
        entry.session.challenge_message_id = Some(message_id);
        Ok(())
    }

    /// Target accepts a pending challenge. Does not extend the deadline.
    pub async fn accept_game(&self, game_id: &str, user_id: &str) -> GameResult<Session> {
        let mut state = self.shared.state.lock().await;
        let entry = state.games.get_mut(game_id).ok_or(GameError::NotFound)?;
        let session = &mut entry.session;
        if session.status != GameStatus::Pending {
            return Err(GameError::InvalidState(
                "This challenge is no longer awaiting acceptance.",
            ));
        }
        if session.target_id != user_id {
            return Err(GameError::Unauthorized(
                "Only the challenged user can accept this game.",
            ));
        }

        session.status = GameStatus::Active;
        info!(game_id, "game accepted");
        Ok(session.clone())
    }

    /// Target declines, in either status. Returns the removed game.
    pub async fn decline_game(&self, game_id: &str, user_id: &str) -> GameResult<Session> {
        let mut state = self.shared.state.lock().await;
        let entry = state.games.get(game_id).ok_or(GameError::NotFound)?;
        if entry.session.target_id != user_id {
            return Err(GameError::Unauthorized(
                "Only the challenged user can decline this game.",
            ));
        }

        let session = state
            .remove_and_cancel(game_id)
            .ok_or(GameError::NotFound)?;
        info!(game_id, "game declined");
        Ok(session)
    }

    /// Record one player's pick. The second pick completes and removes the game.
    pub async fn submit_pick(&self, game_id: &str, user_id: &str, pick: i64) -> GameResult<PickOutcome> {
        let mut state = self.shared.state.lock().await;
        let entry = state.games.get_mut(game_id).ok_or(GameError::NotFound)?;
        let session = &mut entry.session;
        if session.status != GameStatus::Active {
            return Err(GameError::InvalidState("This challenge has not started yet."));
        }
        let pick = u32::try_from(pick)
            .ok()
            .filter(|p| (1..=session.max).contains(p))
            .ok_or(GameError::OutOfRange { max: session.max })?;

        let slot = if user_id == session.challenger_id {
            &mut session.challenger_pick
        } else if user_id == session.target_id {
            &mut session.target_pick
        } else {
            return Err(GameError::Unauthorized(
                "Only the two players can submit numbers.",
            ));
        };
        if slot.is_some() {
            return Err(GameError::DuplicateSubmission);
        }
        *slot = Some(pick);

        let is_complete = session.is_complete();
        let matched = session.is_matched();
        debug!(game_id, user = %user_id, "pick submitted");
        if !is_complete {
            return Ok(PickOutcome {
                session: session.clone(),
                is_complete,
                matched,
            });
        }

        let session = state
            .remove_and_cancel(game_id)
            .ok_or(GameError::NotFound)?;
        info!(game_id, matched, "game completed");
        Ok(PickOutcome {
            session,
            is_complete,
            matched,
        })
    }

    /// Number of unresolved games.
    pub async fn count(&self) -> usize {
        self.shared.state.lock().await.games.len()
    }

    /// Drop every game and cancel every timer without notifying anyone.
    pub async fn shutdown(&self) {
        let mut state = self.shared.state.lock().await;
        let count = state.games.len();
        for (_, entry) in state.games.drain() {
            entry.timer.abort();
        }
        state.locks.clear();
        if count > 0 {
            info!(count, "discarded unresolved games");
        }
    }
}

async fn run_expiry_timer(shared: Weak<Shared>, game_id: String, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    let Some(shared) = shared.upgrade() else {
        return;
    };

    let removed = shared.state.lock().await.remove(&game_id);
    // Already declined or completed while this timer was in flight.
    let Some(Entry { session, timer }) = removed else {
        debug!(game_id = %game_id, "expiry timer fired for a resolved game");
        return;
    };
    // This is our own handle: dropping detaches, aborting would cancel the
    // notification below.
    drop(timer);

    let reason = ExpireReason::from(session.status);
    warn!(game_id = %game_id, reason = %reason, "game expired");
    if let Err(e) = (shared.on_expire)(session, reason).await {
        warn!(game_id = %game_id, error = %e, "expiry notification failed");
    }
}

/// Generate a random game ID (hex-encoded, 16 bytes = 32 hex chars).
fn generate_game_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}
