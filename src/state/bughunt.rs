//! Rules of the BugHunt match, interactive and daily.

use rand::seq::IndexedRandom;
use time::OffsetDateTime;

use crate::{
    dao::models::{
        BugHuntMove, BugHuntState, GameMove, GameState, GameStatus, GameType, LogEntry, LogKind,
        PlayerId, Score,
    },
    state::{
        GameError,
        game::{AnswerKey, Game, TransitionContext},
        scoring::{Progress, ScoringRule},
    },
};

fn mismatch(game: &Game) -> GameError {
    GameError::StateMismatch {
        game_type: game.game_type,
    }
}

fn is_daily(game: &Game) -> bool {
    game.game_type == GameType::BugHuntDaily
}

fn log(state: &mut BugHuntState, player: &str, kind: LogKind, now: OffsetDateTime) {
    state.logs.push(LogEntry {
        player: player.to_owned(),
        timestamp: now,
        kind,
    });
    state.updated_at = now;
}

/// Pick a file uniformly among the corpus entries that carry at least one defect.
fn select_file(
    state: &mut BugHuntState,
    answer: &mut Option<AnswerKey>,
    starter: &str,
    ctx: &mut TransitionContext<'_>,
) -> Result<(), GameError> {
    let eligible: Vec<_> = ctx
        .files
        .iter()
        .filter(|file| !file.buggy_lines.is_empty())
        .collect();
    let file = eligible
        .choose(&mut *ctx.rng)
        .ok_or(GameError::EmptyCorpus)?;

    state.buggy_file_id = Some(file.id.clone());
    *answer = Some(AnswerKey::from_file(file));
    log(state, starter, LogKind::Started, ctx.now);
    Ok(())
}

fn creator(state: &BugHuntState) -> Option<PlayerId> {
    state
        .logs
        .iter()
        .find(|entry| entry.kind == LogKind::Created)
        .map(|entry| entry.player.clone())
}

pub(super) fn join(
    game: &Game,
    player: &str,
    ctx: &mut TransitionContext<'_>,
) -> Result<Game, GameError> {
    let already_joined = game.players.iter().any(|p| p == player);
    if is_daily(game) && already_joined {
        return Ok(game.clone());
    }

    let mut next = game.clone();
    let GameState::BugHunt(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    if !is_daily(game) {
        if state.status != GameStatus::WaitingToStart {
            return Err(GameError::JoinAlreadyStarted);
        }
        if already_joined {
            return Err(GameError::JoinDuplicate);
        }
    }
    let capacity = if is_daily(game) {
        ctx.rules.daily_max_players
    } else {
        ctx.rules.max_players
    };
    if next.players.len() >= capacity {
        return Err(GameError::JoinFull);
    }

    let kind = if next.players.is_empty() && !is_daily(game) {
        LogKind::Created
    } else {
        LogKind::Joined
    };
    next.players.push(player.to_owned());
    log(state, player, kind, ctx.now);

    if !is_daily(game) && next.players.len() >= ctx.rules.max_players {
        let admin = creator(state).unwrap_or_else(|| player.to_owned());
        select_file(state, &mut next.answer, &admin, ctx)?;
        state.status = GameStatus::InProgress;
    }

    Ok(next)
}

pub(super) fn start(
    game: &Game,
    player: &str,
    ctx: &mut TransitionContext<'_>,
) -> Result<Game, GameError> {
    let mut next = game.clone();
    let GameState::BugHunt(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    if is_daily(game) {
        if state.buggy_file_id.is_some() {
            return Ok(game.clone());
        }
        select_file(state, &mut next.answer, player, ctx)?;
        return Ok(next);
    }

    if state.status != GameStatus::WaitingToStart {
        return Err(GameError::StartAlreadyStarted);
    }
    if next.players.is_empty() {
        return Err(GameError::StartNoPlayers);
    }
    if !state
        .logs
        .iter()
        .any(|entry| entry.player == player && entry.kind == LogKind::Created)
    {
        return Err(GameError::StartNotAdmin);
    }

    select_file(state, &mut next.answer, player, ctx)?;
    state.status = GameStatus::InProgress;
    Ok(next)
}

pub(super) fn leave(
    game: &Game,
    player: &str,
    ctx: &mut TransitionContext<'_>,
) -> Result<Game, GameError> {
    if !game.players.iter().any(|p| p == player) {
        return Err(GameError::LeaveNotParticipant {
            player: player.to_owned(),
        });
    }

    let mut next = game.clone();
    let GameState::BugHunt(state) = &mut next.state else {
        return Err(mismatch(game));
    };

    // Finished players keep their seat so winners and scores stay attributable.
    if has_score(state, player) {
        return Ok(game.clone());
    }
    next.players.retain(|p| p != player);
    state.updated_at = ctx.now;

    if !is_daily(game) && state.status == GameStatus::InProgress {
        close_if_finished(state, &next.players);
    }
    Ok(next)
}

pub(super) fn apply_move(
    game: &Game,
    player: &str,
    payload: &BugHuntMove,
    ctx: &mut TransitionContext<'_>,
) -> Result<Game, GameError> {
    let GameState::BugHunt(current) = &game.state else {
        return Err(mismatch(game));
    };

    let accepting = if is_daily(game) {
        current.status == GameStatus::Daily
    } else {
        current.status == GameStatus::InProgress
    };
    if !accepting {
        return Err(GameError::NotInProgress);
    }
    let file_id = current
        .buggy_file_id
        .as_deref()
        .ok_or(GameError::FileNeverChosen)?;
    let answer = game
        .answer
        .as_ref()
        .filter(|answer| answer.file_id() == file_id)
        .ok_or_else(|| GameError::AnswerUnavailable {
            file_id: file_id.to_owned(),
        })?;
    if !game.players.iter().any(|p| p == player) {
        return Err(GameError::NotParticipant);
    }
    let progress = progress_of(current, player, answer, ctx.rules.scoring);
    if progress.guesses >= ctx.rules.max_guesses {
        return Err(GameError::GuessesExhausted);
    }
    if is_winner(current, player) {
        return Err(GameError::AlreadyWon);
    }

    let mut lines = payload.selected_lines.clone();
    lines.sort_unstable();
    lines.dedup();
    if lines.first() == Some(&0) {
        return Err(GameError::LineOutOfRange);
    }
    if !payload.is_hint {
        if lines.is_empty() {
            return Err(GameError::EmptyGuess);
        }
        let expected = answer.defects().len();
        if ctx.rules.scoring == ScoringRule::ExactCount && lines.len() != expected {
            return Err(GameError::WrongLineCount { expected });
        }
    }

    let mut next = game.clone();
    let GameState::BugHunt(state) = &mut next.state else {
        return Err(mismatch(game));
    };
    state.moves.push(GameMove {
        player_id: player.to_owned(),
        instance_id: game.id,
        payload: BugHuntMove {
            selected_lines: lines,
            is_hint: payload.is_hint,
        },
    });
    state.updated_at = ctx.now;

    let progress = progress_of(state, player, answer, ctx.rules.scoring);
    let won = progress.has_won(ctx.rules.win_threshold);
    if won || progress.guesses >= ctx.rules.max_guesses {
        if won {
            state
                .winners
                .get_or_insert_with(Vec::new)
                .push(player.to_owned());
        }
        if !has_score(state, player) {
            let started = score_origin(state, player, is_daily(game));
            let elapsed = (ctx.now - started).whole_milliseconds().max(0);
            state.scores.push(Score {
                player: player.to_owned(),
                elapsed_millis: u64::try_from(elapsed).unwrap_or(u64::MAX),
                accuracy: progress.accuracy(ctx.rules.hint_penalty),
            });
        }
    }

    if !is_daily(game) {
        close_if_finished(state, &next.players);
    }
    Ok(next)
}

fn progress_of(
    state: &BugHuntState,
    player: &str,
    answer: &AnswerKey,
    rule: ScoringRule,
) -> Progress {
    Progress::of(
        rule,
        answer.defects(),
        state
            .moves
            .iter()
            .filter(|entry| entry.player_id == player)
            .map(|entry| &entry.payload),
    )
}

fn is_winner(state: &BugHuntState, player: &str) -> bool {
    state
        .winners
        .as_deref()
        .is_some_and(|winners| winners.iter().any(|w| w == player))
}

fn has_score(state: &BugHuntState, player: &str) -> bool {
    state.scores.iter().any(|score| score.player == player)
}

/// Elapsed time counts from the start of the match; daily players are timed from
/// their first arrival when they joined after the file was chosen.
fn score_origin(state: &BugHuntState, player: &str, daily: bool) -> OffsetDateTime {
    let started = state
        .logs
        .iter()
        .find(|entry| entry.kind == LogKind::Started)
        .map(|entry| entry.timestamp)
        .unwrap_or(state.created_at);
    if !daily {
        return started;
    }
    state
        .logs
        .iter()
        .find(|entry| entry.player == player && entry.kind != LogKind::Started)
        .map_or(started, |joined| joined.timestamp.max(started))
}

/// Every participant has won or spent the budget (an empty match is finished too).
fn close_if_finished(state: &mut BugHuntState, players: &[PlayerId]) {
    if state.status == GameStatus::InProgress
        && players.iter().all(|player| has_score(state, player))
    {
        state.status = GameStatus::Over;
    }
}
