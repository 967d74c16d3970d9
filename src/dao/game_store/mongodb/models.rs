use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    BuggyFileEntity, GameFilter, GameInstance, GameState, GameType, InstanceId, PlayerId,
};

/// Game snapshot as stored in the `games` collection, keyed by the hyphenated instance id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    game_type: GameType,
    players: Vec<PlayerId>,
    state: GameState,
}

impl From<GameInstance> for MongoGameDocument {
    fn from(value: GameInstance) -> Self {
        Self {
            id: value.instance_id.hyphenated().to_string(),
            game_type: value.game_type,
            players: value.players,
            state: value.state,
        }
    }
}

impl TryFrom<MongoGameDocument> for GameInstance {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> MongoResult<Self> {
        let instance_id = Uuid::parse_str(&value.id).map_err(|source| {
            MongoDaoError::InvalidDocumentId {
                id: value.id.clone(),
                source,
            }
        })?;
        Ok(Self {
            instance_id,
            game_type: value.game_type,
            players: value.players,
            state: value.state,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoBuggyFileDocument {
    #[serde(rename = "_id")]
    id: String,
    code: String,
    description: String,
    buggy_lines: Vec<u32>,
}

impl From<BuggyFileEntity> for MongoBuggyFileDocument {
    fn from(value: BuggyFileEntity) -> Self {
        Self {
            id: value.id,
            code: value.code,
            description: value.description,
            buggy_lines: value.buggy_lines,
        }
    }
}

impl From<MongoBuggyFileDocument> for BuggyFileEntity {
    fn from(value: MongoBuggyFileDocument) -> Self {
        Self {
            id: value.id,
            code: value.code,
            description: value.description,
            buggy_lines: value.buggy_lines,
        }
    }
}

pub fn game_doc_id(id: InstanceId) -> Document {
    doc! {"_id": id.hyphenated().to_string()}
}

pub fn file_doc_id(id: &str) -> Document {
    doc! {"_id": id}
}

/// Translate a [`GameFilter`] into a query on the stored camelCase fields.
pub fn filter_document(filter: &GameFilter) -> Document {
    let mut query = Document::new();
    if let Some(kind) = filter.game_type {
        query.insert("gameType", kind.as_str());
    }
    if let Some(status) = filter.status {
        query.insert("state.status", status.as_str());
    }
    query
}
