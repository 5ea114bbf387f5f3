//! Checks a front-end runs before asking the manager to create a game.

use thiserror::Error;

/// Bounds applied to a new challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeLimits {
    pub min_max: u32,
    pub max_max: u32,
    /// Longest accepted prompt, in characters.
    pub prompt_max_len: usize,
}

impl Default for ChallengeLimits {
    fn default() -> Self {
        Self {
            min_max: 2,
            max_max: 10_000,
            prompt_max_len: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("You cannot challenge a bot.")]
    TargetIsBot,

    #[error("You cannot challenge yourself.")]
    SelfChallenge,

    #[error("Max must be between {min} and {max}.")]
    MaxOutOfRange { min: u32, max: u32 },

    #[error("The prompt cannot be empty.")]
    EmptyPrompt,

    #[error("The prompt must be at most {0} characters.")]
    PromptTooLong(usize),
}

/// Validate a challenge request and return the trimmed prompt.
pub fn validate_challenge(
    challenger_id: &str,
    target_id: &str,
    target_is_bot: bool,
    max: i64,
    prompt: &str,
    limits: &ChallengeLimits,
) -> Result<String, ChallengeError> {
    if target_is_bot {
        return Err(ChallengeError::TargetIsBot);
    }
    if target_id == challenger_id {
        return Err(ChallengeError::SelfChallenge);
    }
    if max < i64::from(limits.min_max) || max > i64::from(limits.max_max) {
        return Err(ChallengeError::MaxOutOfRange {
            min: limits.min_max,
            max: limits.max_max,
        });
    }

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ChallengeError::EmptyPrompt);
    }
    if prompt.chars().count() > limits.prompt_max_len {
        return Err(ChallengeError::PromptTooLong(limits.prompt_max_len));
    }
    Ok(prompt.to_string())
}
