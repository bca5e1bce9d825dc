//! Input validation shared by the stores and the playlist service.

use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// Longest accepted playlist name, matching the `playlists.name` column.
pub const MAX_PLAYLIST_NAME_LEN: usize = 255;

/// Reject blank or oversized playlist names.
pub fn validate_playlist_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "playlist name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_PLAYLIST_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "playlist name must be at most {MAX_PLAYLIST_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Run `validator` rules on an input DTO and flatten failures into
/// [`CoreError::Validation`].
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(errors.to_string()))
}

/// A referenced track that does not exist is a caller input error.
pub fn unknown_track_error(track_id: DbId) -> CoreError {
    CoreError::Validation(format!("track {track_id} does not exist"))
}
