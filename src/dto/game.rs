use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    dao::models::{BugHuntMove, BuggyFileEntity, GameInstance, NimMove, PlayerId},
    dto::validation::{validate_player_id, validate_selected_lines},
    error::{ErrorBody, ServiceError},
    state::MovePayload,
};

/// Guess or hint submitted against a BugHunt match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    #[validate(custom(function = validate_player_id))]
    pub player_id: PlayerId,
    #[validate(custom(function = validate_selected_lines))]
    pub selected_lines: Vec<u32>,
    #[serde(default)]
    pub is_hint: bool,
}

impl GuessRequest {
    pub fn into_parts(self) -> (PlayerId, MovePayload) {
        (
            self.player_id,
            MovePayload::BugHunt(BugHuntMove {
                selected_lines: self.selected_lines,
                is_hint: self.is_hint,
            }),
        )
    }
}

/// Turn submitted against a Nim match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TakeRequest {
    #[validate(custom(function = validate_player_id))]
    pub player_id: PlayerId,
    pub num_objects: u32,
}

impl TakeRequest {
    pub fn into_parts(self) -> (PlayerId, MovePayload) {
        (
            self.player_id,
            MovePayload::Nim(NimMove {
                num_objects: self.num_objects,
            }),
        )
    }
}

/// Result of a hint request. `line` is absent when no eligible line remains, in which
/// case no move was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub game: GameInstance,
}

/// Buggy file as shown to players: the defect lines are reduced to their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeBuggyFile {
    pub id: String,
    pub code: String,
    pub description: String,
    pub number_of_bugs: usize,
}

impl From<BuggyFileEntity> for SafeBuggyFile {
    fn from(file: BuggyFileEntity) -> Self {
        Self {
            number_of_bugs: file.buggy_lines.len(),
            id: file.id,
            code: file.code,
            description: file.description,
        }
    }
}

/// Plain-data outcome of a manager call: the payload itself or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameResponse<T> {
    Ok(T),
    Err(ErrorBody),
}

impl<T> From<Result<T, ServiceError>> for GameResponse<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(value) => GameResponse::Ok(value),
            Err(err) => GameResponse::Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameError;

    #[test]
    fn safe_file_hides_the_defect_lines() {
        let safe = SafeBuggyFile::from(BuggyFileEntity {
            id: "f".into(),
            code: "x".into(),
            description: "d".into(),
            buggy_lines: vec![1, 4],
        });
        let value = serde_json::to_value(&safe).unwrap();
        assert_eq!(value["numberOfBugs"], 2);
        assert!(value.get("buggyLines").is_none());
    }

    #[test]
    fn guess_request_is_validated() {
        let request: GuessRequest =
            serde_json::from_str(r#"{"playerId":"ada","selectedLines":[2,3]}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(!request.is_hint);

        let bad = GuessRequest {
            player_id: " ".into(),
            selected_lines: vec![0],
            is_hint: false,
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("player_id"));
        assert!(errors.field_errors().contains_key("selected_lines"));
    }

    #[test]
    fn error_outcome_serializes_as_error_object() {
        let outcome: GameResponse<u32> = Err(ServiceError::from(GameError::NotYourTurn)).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"error": "Invalid move: not your turn"})
        );
        let ok: GameResponse<u32> = Ok(7).into();
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!(7));
    }
}
