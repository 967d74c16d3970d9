//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player identifier.
pub const MAX_PLAYER_ID_LENGTH: usize = 64;
/// Most lines a single guess may name.
pub const MAX_SELECTED_LINES: usize = 200;

/// Validates that a player ID is non-blank, printable and reasonably short.
///
/// ```ignore
/// validate_player_id("ada")    // Ok
/// validate_player_id("  ")     // Err - blank
/// validate_player_id("a\tb")   // Err - control character
/// ```
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_blank");
        err.message = Some("Player ID must not be blank".into());
        return Err(err);
    }

    if id.chars().count() > MAX_PLAYER_ID_LENGTH {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!("Player ID must be at most {MAX_PLAYER_ID_LENGTH} characters").into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_id_format");
        err.message = Some("Player ID must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the line numbers of a guess: 1-based and bounded in count.
pub fn validate_selected_lines(lines: &[u32]) -> Result<(), ValidationError> {
    if lines.len() > MAX_SELECTED_LINES {
        let mut err = ValidationError::new("selected_lines_length");
        err.message = Some(
            format!(
                "At most {MAX_SELECTED_LINES} lines may be selected (got {})",
                lines.len()
            )
            .into(),
        );
        return Err(err);
    }

    if lines.contains(&0) {
        let mut err = ValidationError::new("selected_lines_range");
        err.message = Some("Line numbers start at 1".into());
        return Err(err);
    }

    Ok(())
}
