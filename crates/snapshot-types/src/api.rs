use serde::{Deserialize, Serialize};

use crate::models::Theme;

// -- Mood --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoodRequest {
    /// Platform id of the prompt message the user is expected to react to.
    pub message_id: u64,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub mood: String,
    pub description: String,
}

// -- Note --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNoteRequest {
    pub note: String,
}

// -- Theme --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetThemeRequest {
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

// -- Reactions --

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub matched: bool,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
