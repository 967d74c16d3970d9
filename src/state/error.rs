use thiserror::Error;

use crate::dao::models::{GameType, PlayerId};

/// Rejection raised by a game transition. The display text is the message callers see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Cannot join game: already started")]
    JoinAlreadyStarted,
    #[error("Cannot join game: player already in game")]
    JoinDuplicate,
    #[error("Cannot join game: max number of players already in game")]
    JoinFull,
    #[error("Cannot start game: game already started")]
    StartAlreadyStarted,
    #[error("Cannot start game: no players")]
    StartNoPlayers,
    #[error("Cannot start game: not game admin")]
    StartNotAdmin,
    #[error("Cannot start game: {game_type} starts once both players have joined")]
    StartAutomatic { game_type: GameType },
    #[error("Cannot leave game: player {player} is not in the game.")]
    LeaveNotParticipant { player: PlayerId },
    #[error("Invalid move: game is not in progress")]
    NotInProgress,
    #[error("Invalid move: player is not in the game")]
    NotParticipant,
    #[error("Invalid move: player already guessed the maximum number of times")]
    GuessesExhausted,
    #[error("Invalid move: player has already won")]
    AlreadyWon,
    #[error("Invalid move: no lines selected")]
    EmptyGuess,
    #[error("Invalid move: line numbers start at 1")]
    LineOutOfRange,
    #[error("Invalid move: select exactly {expected} lines")]
    WrongLineCount { expected: usize },
    #[error("Invalid move: not your turn")]
    NotYourTurn,
    #[error("Invalid move: take between 1 and {max} objects")]
    InvalidTake { max: u32 },
    #[error("Invalid move: only {remaining} objects remain")]
    TakeExceedsRemaining { remaining: u32 },
    #[error("Invalid move: payload does not fit a {game_type} game")]
    PayloadMismatch { game_type: GameType },
    #[error("Cannot select buggy file: no files found")]
    EmptyCorpus,
    #[error("Game error: Buggy file was never chosen")]
    FileNeverChosen,
    #[error("Game error: buggy file `{file_id}` is not available")]
    AnswerUnavailable { file_id: String },
    #[error("Game error: stored state does not match game type {game_type}")]
    StateMismatch { game_type: GameType },
}

impl GameError {
    /// Whether the failure reflects broken data rather than an illegal request.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            GameError::EmptyCorpus
                | GameError::FileNeverChosen
                | GameError::AnswerUnavailable { .. }
                | GameError::StateMismatch { .. }
        )
    }
}
