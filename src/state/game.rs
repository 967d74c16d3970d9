use std::{collections::BTreeSet, fmt};

use rand::rngs::StdRng;
use time::OffsetDateTime;

use crate::{
    config::GameRules,
    dao::models::{
        BugHuntState, BuggyFileEntity, GameInstance, GameState, GameStatus, GameType,
        InstanceId, NimState, PlayerId,
    },
    state::{GameError, state_machine::GameEvent},
};

/// Ground-truth defect lines of the selected buggy file.
///
/// Held only in memory: it never reaches a snapshot and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AnswerKey {
    file_id: String,
    defects: BTreeSet<u32>,
}

impl AnswerKey {
    pub fn from_file(file: &BuggyFileEntity) -> Self {
        Self {
            file_id: file.id.clone(),
            defects: file.buggy_lines.iter().copied().collect(),
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub(crate) fn defects(&self) -> &BTreeSet<u32> {
        &self.defects
    }
}

impl fmt::Debug for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerKey")
            .field("file_id", &self.file_id)
            .field("defects", &format_args!("<{} redacted>", self.defects.len()))
            .finish()
    }
}

/// Inputs a transition may draw on besides the game itself.
pub struct TransitionContext<'a> {
    pub rules: &'a GameRules,
    pub now: OffsetDateTime,
    /// Eligible corpus files; only populated when [`Game::corpus_needed`] says so.
    pub files: &'a [BuggyFileEntity],
    pub rng: &'a mut StdRng,
}

/// Live game held by the manager: the persisted snapshot plus private runtime data.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub(super) id: InstanceId,
    pub(super) game_type: GameType,
    pub(super) players: Vec<PlayerId>,
    pub(super) state: GameState,
    pub(super) answer: Option<AnswerKey>,
}

impl Game {
    /// Type-directed factory for a fresh instance.
    pub fn new(id: InstanceId, game_type: GameType, rules: &GameRules, now: OffsetDateTime) -> Self {
        let state = match game_type {
            GameType::BugHunt | GameType::BugHuntDaily => GameState::BugHunt(BugHuntState {
                status: if game_type == GameType::BugHuntDaily {
                    GameStatus::Daily
                } else {
                    GameStatus::WaitingToStart
                },
                winners: None,
                moves: Vec::new(),
                buggy_file_id: None,
                created_at: now,
                updated_at: now,
                logs: Vec::new(),
                scores: Vec::new(),
            }),
            GameType::Nim => GameState::Nim(NimState {
                status: GameStatus::WaitingToStart,
                winners: None,
                moves: Vec::new(),
                player1: None,
                player2: None,
                remaining_objects: rules.nim_objects,
            }),
        };

        Self {
            id,
            game_type,
            players: Vec::new(),
            state,
            answer: None,
        }
    }

    /// Rebuild a game from its persisted snapshot. The answer key is attached separately.
    pub fn from_model(instance: GameInstance) -> Result<Self, GameError> {
        if !instance.is_consistent() {
            return Err(GameError::StateMismatch {
                game_type: instance.game_type,
            });
        }
        Ok(Self {
            id: instance.instance_id,
            game_type: instance.game_type,
            players: instance.players,
            state: instance.state,
            answer: None,
        })
    }

    /// Snapshot used both on the wire and in the store.
    pub fn to_model(&self) -> GameInstance {
        GameInstance {
            instance_id: self.id,
            game_type: self.game_type,
            players: self.players.clone(),
            state: self.state.clone(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn is_over(&self) -> bool {
        self.status() == GameStatus::Over
    }

    pub fn buggy_file_id(&self) -> Option<&str> {
        match &self.state {
            GameState::BugHunt(state) => state.buggy_file_id.as_deref(),
            GameState::Nim(_) => None,
        }
    }

    /// File whose answer key must be loaded before the game can accept moves.
    pub fn missing_answer(&self) -> Option<&str> {
        if self.answer.is_some() || self.is_over() {
            return None;
        }
        self.buggy_file_id()
    }

    /// Attach the answer key of the selected file after rehydration.
    pub fn restore_answer(&mut self, file: &BuggyFileEntity) -> Result<(), GameError> {
        match self.buggy_file_id() {
            Some(id) if id == file.id => {
                self.answer = Some(AnswerKey::from_file(file));
                Ok(())
            }
            Some(id) => Err(GameError::AnswerUnavailable {
                file_id: id.to_owned(),
            }),
            None => Err(GameError::FileNeverChosen),
        }
    }

    /// Whether applying `event` may select a buggy file.
    pub fn corpus_needed(&self, event: &GameEvent, rules: &GameRules) -> bool {
        let GameState::BugHunt(state) = &self.state else {
            return false;
        };
        if state.buggy_file_id.is_some() {
            return false;
        }
        match event {
            GameEvent::Start(_) => true,
            GameEvent::Join(_) => {
                self.game_type == GameType::BugHunt
                    && state.status == GameStatus::WaitingToStart
                    && self.players.len() + 1 >= rules.max_players
            }
            _ => false,
        }
    }

    /// Lines a player has already selected or been shown as hints.
    pub fn known_lines(&self, player: &str) -> BTreeSet<u32> {
        match &self.state {
            GameState::BugHunt(state) => state
                .moves
                .iter()
                .filter(|entry| entry.player_id == player)
                .flat_map(|entry| entry.payload.selected_lines.iter().copied())
                .collect(),
            GameState::Nim(_) => BTreeSet::new(),
        }
    }
}
