use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of a game instance.
pub type InstanceId = Uuid;
/// Identifier of a player (the forum username).
pub type PlayerId = String;

/// Discriminates which rules a game instance follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    /// Two-player counter game.
    Nim,
    /// Interactive BugHunt match with a capacity-triggered start.
    BugHunt,
    /// Shared, non-terminating BugHunt challenge scoped to one calendar day.
    BugHuntDaily,
}

impl GameType {
    /// Stable tag used in persisted documents and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Nim => "Nim",
            GameType::BugHunt => "BugHunt",
            GameType::BugHuntDaily => "BugHuntDaily",
        }
    }

    /// Whether instances of this type carry a [`BugHuntState`].
    pub fn is_bughunt(&self) -> bool {
        matches!(self, GameType::BugHunt | GameType::BugHuntDaily)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status shared by every game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Players may still join.
    WaitingToStart,
    /// Moves are accepted.
    InProgress,
    /// Terminal: no further mutation.
    Over,
    /// Permanent status of the daily challenge.
    Daily,
}

impl GameStatus {
    /// Wire tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::WaitingToStart => "WAITING_TO_START",
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::Over => "OVER",
            GameStatus::Daily => "DAILY",
        }
    }

    /// Whether moves are accepted in this status.
    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::InProgress | GameStatus::Daily)
    }
}

/// Kind of lifecycle event recorded in a BugHunt audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    /// The first player joined and became the match admin.
    Created,
    /// Any subsequent player joined.
    Joined,
    /// A buggy file was selected and the clock started.
    Started,
}

/// Append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub player: PlayerId,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub kind: LogKind,
}

/// Final result of one player in a BugHunt match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player: PlayerId,
    pub elapsed_millis: u64,
    pub accuracy: f64,
}

/// Payload of a BugHunt move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugHuntMove {
    /// Line numbers (1-based) the player believes are defective.
    pub selected_lines: Vec<u32>,
    /// Hint moves reveal a clean line instead of guessing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hint: bool,
}

/// Payload of a Nim move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NimMove {
    pub num_objects: u32,
}

/// A move submitted by a player against a game instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMove<M> {
    pub player_id: PlayerId,
    #[serde(with = "uuid_string")]
    pub instance_id: InstanceId,
    pub payload: M,
}

/// Persisted state of a BugHunt match (interactive or daily).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugHuntState {
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<PlayerId>>,
    pub moves: Vec<GameMove<BugHuntMove>>,
    /// Identifier of the selected buggy file; its answer key is never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buggy_file_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub logs: Vec<LogEntry>,
    pub scores: Vec<Score>,
}

/// Persisted state of a Nim match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NimState {
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<PlayerId>>,
    pub moves: Vec<GameMove<NimMove>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2: Option<PlayerId>,
    pub remaining_objects: u32,
}

/// State of any game, discriminated structurally; [`GameInstance::game_type`] is the tag
/// callers dispatch on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameState {
    BugHunt(BugHuntState),
    Nim(NimState),
}

impl GameState {
    /// Current lifecycle status.
    pub fn status(&self) -> GameStatus {
        match self {
            GameState::BugHunt(state) => state.status,
            GameState::Nim(state) => state.status,
        }
    }

    /// Winners recorded so far, if any.
    pub fn winners(&self) -> &[PlayerId] {
        let winners = match self {
            GameState::BugHunt(state) => state.winners.as_deref(),
            GameState::Nim(state) => state.winners.as_deref(),
        };
        winners.unwrap_or_default()
    }
}

/// Snapshot of a game: both the wire representation and the persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInstance {
    #[serde(with = "uuid_string")]
    pub instance_id: InstanceId,
    pub game_type: GameType,
    pub players: Vec<PlayerId>,
    pub state: GameState,
}

impl GameInstance {
    /// Current lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    /// Whether the state shape agrees with the declared game type.
    pub fn is_consistent(&self) -> bool {
        match (&self.state, self.game_type) {
            (GameState::BugHunt(_), kind) => kind.is_bughunt(),
            (GameState::Nim(_), GameType::Nim) => true,
            _ => false,
        }
    }

    /// Creation timestamp for types that track one.
    pub fn created_at(&self) -> Option<OffsetDateTime> {
        match &self.state {
            GameState::BugHunt(state) => Some(state.created_at),
            GameState::Nim(_) => None,
        }
    }
}

/// Challenge snippet with its ground-truth defect lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuggyFileEntity {
    pub id: String,
    pub code: String,
    pub description: String,
    pub buggy_lines: Vec<u32>,
}

/// Optional criteria when listing game instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub game_type: Option<GameType>,
    pub status: Option<GameStatus>,
}

impl GameFilter {
    /// Whether a snapshot satisfies every criterion that is set.
    pub fn matches(&self, game: &GameInstance) -> bool {
        self.game_type.is_none_or(|kind| kind == game.game_type)
            && self.status.is_none_or(|status| status == game.status())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialize identifiers as hyphenated strings regardless of the target format, so JSON
/// and BSON documents agree.
mod uuid_string {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&id.hyphenated())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(de::Error::custom)
    }
}
