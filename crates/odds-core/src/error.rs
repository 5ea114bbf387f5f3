use thiserror::Error;

/// Errors returned by the game manager.
///
/// The `Display` text of every variant is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Unknown identifier, or the game was already resolved.
    #[error("This challenge no longer exists.")]
    NotFound,

    /// The operation is not valid for the game's current status.
    #[error("{0}")]
    InvalidState(&'static str),

    /// The caller is not the party allowed to perform the operation.
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Your pick must be between 1 and {max}.")]
    OutOfRange { max: u32 },

    #[error("You already submitted your number.")]
    DuplicateSubmission,

    #[error("That user already has an active odds challenge in this channel.")]
    LockConflict,
}

pub type GameResult<T> = Result<T, GameError>;
