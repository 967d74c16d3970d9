use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::dao::models::{BuggyFileEntity, GameInstance, GameState, GameType, InstanceId, PlayerId};

pub const GAME_PREFIX: &str = "game::";
pub const FILE_PREFIX: &str = "buggyfile::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Only the revision is read back when preparing an update.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBody {
    pub game_type: GameType,
    pub players: Vec<PlayerId>,
    pub state: GameState,
}

impl From<(GameInstance, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameInstance, Option<String>)) -> Self {
        Self {
            id: game_doc_id(game.instance_id),
            rev,
            game: GameBody {
                game_type: game.game_type,
                players: game.players,
                state: game.state,
            },
        }
    }
}

impl TryFrom<CouchGameDocument> for GameInstance {
    type Error = CouchDaoError;

    fn try_from(doc: CouchGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            instance_id: extract_uuid(&doc.id)?,
            game_type: doc.game.game_type,
            players: doc.game.players,
            state: doc.game.state,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchBuggyFileDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub file: BuggyFileBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuggyFileBody {
    pub code: String,
    pub description: String,
    pub buggy_lines: Vec<u32>,
}

impl From<(BuggyFileEntity, Option<String>)> for CouchBuggyFileDocument {
    fn from((file, rev): (BuggyFileEntity, Option<String>)) -> Self {
        Self {
            id: file_doc_id(&file.id),
            rev,
            file: BuggyFileBody {
                code: file.code,
                description: file.description,
                buggy_lines: file.buggy_lines,
            },
        }
    }
}

impl TryFrom<CouchBuggyFileDocument> for BuggyFileEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchBuggyFileDocument) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .strip_prefix(FILE_PREFIX)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CouchDaoError::InvalidDocId {
                doc_id: doc.id.clone(),
                kind: "missing buggy file prefix",
            })?
            .to_owned();
        Ok(Self {
            id,
            code: doc.file.code,
            description: doc.file.description,
            buggy_lines: doc.file.buggy_lines,
        })
    }
}

pub fn game_doc_id(id: InstanceId) -> String {
    format!("{}{}", GAME_PREFIX, id.hyphenated())
}

pub fn file_doc_id(id: &str) -> String {
    format!("{}{}", FILE_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let id = doc_id
        .strip_prefix(GAME_PREFIX)
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing game prefix",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GameStatus, NimState};

    #[test]
    fn game_document_flattens_body_next_to_couch_fields() {
        let id = Uuid::new_v4();
        let game = GameInstance {
            instance_id: id,
            game_type: GameType::Nim,
            players: vec!["ada".into(), "bob".into()],
            state: GameState::Nim(NimState {
                status: GameStatus::InProgress,
                winners: None,
                moves: vec![],
                player1: Some("ada".into()),
                player2: Some("bob".into()),
                remaining_objects: 21,
            }),
        };
        let doc = CouchGameDocument::from((game.clone(), None));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], format!("game::{id}"));
        assert!(value.get("_rev").is_none());
        assert_eq!(value["gameType"], "Nim");
        assert_eq!(value["state"]["remainingObjects"], 21);

        let parsed: CouchGameDocument = serde_json::from_value(value).unwrap();
        assert_eq!(GameInstance::try_from(parsed).unwrap(), game);
    }

    #[test]
    fn extract_uuid_rejects_foreign_ids() {
        assert!(extract_uuid("buggyfile::abc").is_err());
        assert!(extract_uuid("game::not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(extract_uuid(&game_doc_id(id)).unwrap(), id);
    }

    #[test]
    fn buggy_file_id_round_trips_through_prefix() {
        let file = BuggyFileEntity {
            id: "off-by-one".into(),
            code: "a\nb".into(),
            description: "loop bound".into(),
            buggy_lines: vec![2],
        };
        let doc = CouchBuggyFileDocument::from((file.clone(), Some("1-abc".into())));
        assert_eq!(doc.id, "buggyfile::off-by-one");
        assert_eq!(BuggyFileEntity::try_from(doc).unwrap(), file);
    }
}
