//! Interaction handlers: validate input, drive the game manager, and turn
//! the outcome into replies.

use crate::render;
use odds_core::{
    validate_challenge, Action, ChallengeLimits, CustomId, ExpireReason, GameManager, GameStatus,
    NewGame, Scope, Session,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Who sees a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Only this user (ephemeral reply).
    User(String),
    /// Everyone in the channel.
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub audience: Audience,
    pub text: String,
}

impl Reply {
    fn to_user(user: &str, text: impl Into<String>) -> Self {
        Self {
            audience: Audience::User(user.to_string()),
            text: text.into(),
        }
    }

    fn to_channel(text: impl Into<String>) -> Self {
        Self {
            audience: Audience::Channel,
            text: text.into(),
        }
    }
}

/// Front-end for one channel.
pub struct OddsBot {
    manager: GameManager,
    limits: ChallengeLimits,
    scope: Scope,
    next_message_id: AtomicU64,
}

impl OddsBot {
    pub fn new(manager: GameManager, limits: ChallengeLimits, scope: Scope) -> Self {
        Self {
            manager,
            limits,
            scope,
            next_message_id: AtomicU64::new(1),
        }
    }

    /// `/odds` slash command.
    pub async fn odds(&self, user: &str, target: &str, max: i64, prompt: &str) -> Vec<Reply> {
        let target_is_bot = target.to_ascii_lowercase().ends_with("bot");
        let prompt = match validate_challenge(user, target, target_is_bot, max, prompt, &self.limits)
        {
            Ok(prompt) => prompt,
            Err(e) => return vec![Reply::to_user(user, e.to_string())],
        };
        // validate_challenge bounds max by limits, which are u32.
        let Ok(max) = u32::try_from(max) else {
            return vec![Reply::to_user(user, "Max is out of range.")];
        };

        let created = self
            .manager
            .create_game(NewGame {
                scope: self.scope.clone(),
                challenger_id: user.to_string(),
                target_id: target.to_string(),
                max,
                prompt,
            })
            .await;
        let session = match created {
            Ok(session) => session,
            Err(e) => return vec![Reply::to_user(user, e.to_string())],
        };

        let message_id = format!("msg-{}", self.next_message_id.fetch_add(1, Ordering::Relaxed));
        if let Err(e) = self
            .manager
            .set_challenge_message(&session.id, message_id.clone())
            .await
        {
            // Only possible if the game already expired.
            warn!(game_id = %session.id, error = %e, "could not record challenge message");
        }
        debug!(game_id = %session.id, message_id = %message_id, "challenge posted");

        vec![
            Reply::to_user(user, render::challenge_sent(target)),
            Reply::to_channel(render::challenge(&session, self.manager.timeout())),
        ]
    }

    /// Button press.
    pub async fn click(&self, user: &str, custom_id: &str) -> Vec<Reply> {
        let parsed = match custom_id.parse::<CustomId>() {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(custom_id, error = %e, "ignoring unknown button");
                return Vec::new();
            }
        };

        let Some(session) = self.manager.get_game(&parsed.game_id).await else {
            return vec![Reply::to_user(user, "This challenge is no longer active.")];
        };

        match parsed.action {
            Action::Accept => match self.manager.accept_game(&session.id, user).await {
                Ok(session) => vec![Reply::to_channel(render::accepted(&session))],
                Err(e) => vec![Reply::to_user(user, e.to_string())],
            },
            Action::Decline => match self.manager.decline_game(&session.id, user).await {
                Ok(session) => vec![Reply::to_channel(render::declined(&session))],
                Err(e) => vec![Reply::to_user(user, e.to_string())],
            },
            Action::Enter => {
                if !session.is_player(user) {
                    return vec![Reply::to_user(user, "Only the two players can enter a number.")];
                }
                if session.status != GameStatus::Active {
                    return vec![Reply::to_user(user, "This game is not active.")];
                }
                vec![Reply::to_user(user, render::pick_dialog(&session))]
            }
            Action::Submit => {
                debug!(custom_id, "submit token used as a button");
                Vec::new()
            }
        }
    }

    /// Pick dialog submission.
    pub async fn submit(&self, user: &str, custom_id: &str, raw_pick: &str) -> Vec<Reply> {
        let parsed = match custom_id.parse::<CustomId>() {
            Ok(parsed) if parsed.action == Action::Submit => parsed,
            _ => {
                debug!(custom_id, "ignoring submission with a non-submit token");
                return Vec::new();
            }
        };

        let Ok(pick) = raw_pick.trim().parse::<i64>() else {
            return vec![Reply::to_user(user, "Enter a valid integer.")];
        };

        let outcome = match self.manager.submit_pick(&parsed.game_id, user, pick).await {
            Ok(outcome) => outcome,
            Err(e) => return vec![Reply::to_user(user, e.to_string())],
        };

        let mut replies = vec![Reply::to_user(user, render::pick_submitted(pick))];
        if outcome.is_complete {
            if let Some(text) = render::result(&outcome.session, outcome.matched) {
                replies.push(Reply::to_channel(text));
            }
        }
        replies
    }

    /// Notice for a game the manager expired.
    pub fn expired(&self, session: &Session, reason: ExpireReason) -> Vec<Reply> {
        let mut replies = Vec::new();
        if let Some(message_id) = &session.challenge_message_id {
            replies.push(Reply::to_channel(format!("(challenge message {message_id} removed)")));
        }
        replies.push(Reply::to_channel(render::expired(session, reason)));
        replies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    type Expired = mpsc::UnboundedReceiver<(Session, ExpireReason)>;

    fn bot(timeout_ms: u64) -> (OddsBot, Expired) {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = GameManager::new(Duration::from_millis(timeout_ms), move |session, reason| {
            let tx = tx.clone();
            async move {
                tx.send((session, reason))
                    .map_err(|e| anyhow::anyhow!("expiry receiver dropped: {e}"))
            }
        });
        let bot = OddsBot::new(manager, ChallengeLimits::default(), Scope::new("console", "general"));
        (bot, rx)
    }

    /// Pull the custom id for `action` out of rendered replies.
    fn token(replies: &[Reply], action: Action) -> String {
        let needle = format!("odds:{}:", action.as_str());
        replies
            .iter()
            .find_map(|r| {
                let start = r.text.find(&needle)?;
                let rest = &r.text[start..];
                let end = rest.find(|c: char| c == ']' || c.is_whitespace()).unwrap_or(rest.len());
                Some(rest[..end].to_string())
            })
            .unwrap()
    }

    fn texts(replies: &[Reply]) -> String {
        replies.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    #[tokio::test]
    async fn full_game_with_match() {
        let (bot, _rx) = bot(120_000);
        let posted = bot.odds("alice", "bob", 5, "  sing  ").await;
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].audience, Audience::User("alice".into()));
        assert_eq!(posted[1].audience, Audience::Channel);
        assert!(posted[1].text.contains("Prompt: \"sing\""));

        let accept = token(&posted, Action::Accept);
        let denied = bot.click("alice", &accept).await;
        assert!(texts(&denied).contains("Only the challenged user can accept"));

        let accepted = bot.click("bob", &accept).await;
        assert!(texts(&accepted).contains("@bob accepted!"));
        let enter = token(&accepted, Action::Enter);

        let dialog = bot.click("alice", &enter).await;
        let submit = token(&dialog, Action::Submit);
        let outsider = bot.click("carol", &enter).await;
        assert!(texts(&outsider).contains("Only the two players"));

        let bad = bot.submit("alice", &submit, "eight").await;
        assert_eq!(texts(&bad), "Enter a valid integer.");
        let out_of_range = bot.submit("alice", &submit, "8").await;
        assert_eq!(texts(&out_of_range), "Your pick must be between 1 and 5.");

        let first = bot.submit("alice", &submit, "2").await;
        assert_eq!(first.len(), 1);
        let second = bot.submit("bob", &submit, " 2 ").await;
        assert_eq!(second.len(), 2);
        assert!(second[1].text.contains("Numbers matched at **2**"));

        let gone = bot.click("bob", &accept).await;
        assert_eq!(texts(&gone), "This challenge is no longer active.");
    }

    #[tokio::test]
    async fn validation_happens_before_creation() {
        let (bot, _rx) = bot(120_000);
        assert_eq!(
            texts(&bot.odds("alice", "alice", 5, "x").await),
            "You cannot challenge yourself."
        );
        assert_eq!(
            texts(&bot.odds("alice", "HelperBot", 5, "x").await),
            "You cannot challenge a bot."
        );
        assert_eq!(
            texts(&bot.odds("alice", "bob", 1, "x").await),
            "Max must be between 2 and 10000."
        );
        assert_eq!(bot.manager.count().await, 0);
    }

    #[tokio::test]
    async fn second_challenge_for_same_target_is_refused() {
        let (bot, _rx) = bot(120_000);
        bot.odds("alice", "bob", 5, "x").await;
        let again = bot.odds("carol", "bob", 5, "y").await;
        assert!(texts(&again).contains("already has an active odds challenge"));
    }

    #[tokio::test]
    async fn decline_posts_notice_and_frees_target() {
        let (bot, _rx) = bot(120_000);
        let posted = bot.odds("alice", "bob", 5, "x").await;
        let decline = token(&posted, Action::Decline);
        let declined = bot.click("bob", &decline).await;
        assert_eq!(texts(&declined), "@bob declined the challenge from @alice.");
        assert_eq!(bot.odds("alice", "bob", 5, "x").await.len(), 2);
    }

    #[tokio::test]
    async fn malformed_tokens_are_ignored() {
        let (bot, _rx) = bot(120_000);
        assert!(bot.click("bob", "garbage").await.is_empty());
        assert!(bot.submit("bob", "odds:accept:abc", "1").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_notice_mentions_challenge_message() {
        let (bot, mut rx) = bot(1000);
        bot.odds("alice", "bob", 5, "x").await;

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let (session, reason) = rx.recv().await.unwrap();
        let notice = texts(&bot.expired(&session, reason));
        assert!(notice.contains("(challenge message msg-1 removed)"));
        assert!(notice.contains("Challenge timed out before it was accepted."));
    }
}
