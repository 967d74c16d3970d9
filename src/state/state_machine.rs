//! Dispatch table routing lifecycle events to the rules of each game variant.

use crate::{
    dao::models::{BugHuntMove, GameState, GameType, NimMove, PlayerId},
    state::{
        GameError, bughunt, nim,
        game::{Game, TransitionContext},
    },
};

/// Payload of a move, one variant per game family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePayload {
    BugHunt(BugHuntMove),
    Nim(NimMove),
}

/// Request to change a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Join(PlayerId),
    Leave(PlayerId),
    Start(PlayerId),
    Move(PlayerId, MovePayload),
}

impl GameEvent {
    /// Player that triggered the event.
    pub fn player(&self) -> &str {
        match self {
            GameEvent::Join(player)
            | GameEvent::Leave(player)
            | GameEvent::Start(player)
            | GameEvent::Move(player, _) => player,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            GameEvent::Join(_) => "join",
            GameEvent::Leave(_) => "leave",
            GameEvent::Start(_) => "start",
            GameEvent::Move(..) => "move",
        }
    }
}

/// Compute the game that results from `event`.
///
/// The input is never modified: on success the caller replaces its copy wholesale, on
/// failure nothing changed.
pub fn compute_transition(
    game: &Game,
    event: &GameEvent,
    ctx: &mut TransitionContext<'_>,
) -> Result<Game, GameError> {
    match (&game.state, event) {
        (GameState::BugHunt(_), GameEvent::Join(player)) => bughunt::join(game, player, ctx),
        (GameState::BugHunt(_), GameEvent::Start(player)) => bughunt::start(game, player, ctx),
        (GameState::BugHunt(_), GameEvent::Leave(player)) => bughunt::leave(game, player, ctx),
        (GameState::BugHunt(_), GameEvent::Move(player, MovePayload::BugHunt(payload))) => {
            bughunt::apply_move(game, player, payload, ctx)
        }
        (GameState::Nim(_), GameEvent::Join(player)) => nim::join(game, player),
        (GameState::Nim(_), GameEvent::Start(_)) => Err(GameError::StartAutomatic {
            game_type: GameType::Nim,
        }),
        (GameState::Nim(_), GameEvent::Leave(player)) => nim::leave(game, player),
        (GameState::Nim(_), GameEvent::Move(player, MovePayload::Nim(payload))) => {
            nim::apply_move(game, player, *payload)
        }
        (_, GameEvent::Move(..)) => Err(GameError::PayloadMismatch {
            game_type: game.game_type,
        }),
    }
}
