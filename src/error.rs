use thiserror::Error;

use crate::action::ActionKind;

/// Fatal engine errors. Any of these means the engine itself is broken (or was
/// set up wrong), so the game is aborted instead of patched over.
#[derive(Debug, Error)]
pub enum CoupError {
    #[error("a game needs between {min} and {max} players, got {got}")]
    InvalidPlayerCount { got: usize, min: usize, max: usize },

    #[error("tried to draw from an empty deck")]
    DeckExhausted,

    #[error("player {0} does not exist")]
    UnknownPlayer(usize),

    #[error("player {0} is eliminated and cannot act")]
    PlayerEliminated(usize),

    #[error("{0:?} needs a target")]
    MissingTarget(ActionKind),

    #[error("an action is already pending, refusing to start another")]
    PendingActionConflict,

    #[error("the game is already over")]
    GameOver,

    #[error("nobody is left alive")]
    NoSurvivors,

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
