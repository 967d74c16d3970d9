//! Two-player Nim: take 1 to 3 objects per turn, whoever takes the last one loses.

use crate::{
    dao::models::{GameMove, GameState, GameStatus, NimMove, NimState, PlayerId},
    state::{GameError, game::Game},
};

const MAX_TAKE: u32 = 3;

fn mismatch(game: &Game) -> GameError {
    GameError::StateMismatch {
        game_type: game.game_type,
    }
}

fn opponent(state: &NimState, player: &str) -> Option<PlayerId> {
    match (&state.player1, &state.player2) {
        (Some(p1), Some(p2)) if p1 == player => Some(p2.clone()),
        (Some(p1), Some(p2)) if p2 == player => Some(p1.clone()),
        _ => None,
    }
}

pub(super) fn join(game: &Game, player: &str) -> Result<Game, GameError> {
    let mut next = game.clone();
    let GameState::Nim(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    if state.status != GameStatus::WaitingToStart {
        return Err(GameError::JoinAlreadyStarted);
    }
    if next.players.iter().any(|p| p == player) {
        return Err(GameError::JoinDuplicate);
    }

    if state.player1.is_none() {
        state.player1 = Some(player.to_owned());
    } else if state.player2.is_none() {
        state.player2 = Some(player.to_owned());
        state.status = GameStatus::InProgress;
    } else {
        return Err(GameError::JoinFull);
    }
    next.players.push(player.to_owned());
    Ok(next)
}

pub(super) fn leave(game: &Game, player: &str) -> Result<Game, GameError> {
    if !game.players.iter().any(|p| p == player) {
        return Err(GameError::LeaveNotParticipant {
            player: player.to_owned(),
        });
    }

    let mut next = game.clone();
    let GameState::Nim(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    match state.status {
        GameStatus::InProgress => {
            state.winners = opponent(state, player).map(|winner| vec![winner]);
            state.status = GameStatus::Over;
        }
        GameStatus::WaitingToStart => {
            if state.player1.as_deref() == Some(player) {
                state.player1 = state.player2.take();
            } else if state.player2.as_deref() == Some(player) {
                state.player2 = None;
            }
        }
        GameStatus::Over | GameStatus::Daily => return Ok(game.clone()),
    }
    next.players.retain(|p| p != player);
    Ok(next)
}

pub(super) fn apply_move(game: &Game, player: &str, payload: NimMove) -> Result<Game, GameError> {
    let mut next = game.clone();
    let GameState::Nim(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    if state.status != GameStatus::InProgress {
        return Err(GameError::NotInProgress);
    }
    if !next.players.iter().any(|p| p == player) {
        return Err(GameError::NotParticipant);
    }
    let on_turn = if state.moves.len() % 2 == 0 {
        state.player1.as_deref()
    } else {
        state.player2.as_deref()
    };
    if on_turn != Some(player) {
        return Err(GameError::NotYourTurn);
    }
    if !(1..=MAX_TAKE).contains(&payload.num_objects) {
        return Err(GameError::InvalidTake { max: MAX_TAKE });
    }
    if payload.num_objects > state.remaining_objects {
        return Err(GameError::TakeExceedsRemaining {
            remaining: state.remaining_objects,
        });
    }

    state.moves.push(GameMove {
        player_id: player.to_owned(),
        instance_id: game.id,
        payload,
    });
    state.remaining_objects -= payload.num_objects;

    if state.remaining_objects == 0 {
        state.winners = opponent(state, player).map(|winner| vec![winner]);
        state.status = GameStatus::Over;
    }
    Ok(next)
}
