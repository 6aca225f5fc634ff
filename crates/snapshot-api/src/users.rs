use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use snapshot_types::UserId;
use snapshot_types::api::{
    MoodRequest, MoodResponse, SetNoteRequest, SetThemeRequest, ThemeResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Blocks until the user reacts to the prompt message or the mood timeout
/// elapses (408, nothing recorded).
pub async fn set_mood(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<MoodRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mood = state.commands.set_mood(user_id, req.message_id).await?;
    Ok(Json(MoodResponse {
        mood: mood.emoji().to_string(),
        description: mood.description().to_string(),
    }))
}

pub async fn set_note(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<SetNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.commands.set_note(user_id, &req.note).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_theme(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<SetThemeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let theme = state.commands.set_theme(user_id, &req.theme).await?;
    Ok(Json(ThemeResponse { theme }))
}

pub async fn get_theme(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    let theme = state.commands.get_theme(user_id).await?;
    Ok(Json(ThemeResponse { theme }))
}

/// Compile today's snapshot and send it now, outside the daily schedule.
pub async fn snapshot_now(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.commands.snapshot_now(user_id).await?;
    Ok(Json(snapshot))
}
