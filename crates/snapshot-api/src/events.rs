use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use snapshot_types::api::ReactionResponse;
use snapshot_types::events::{MessageEvent, ReactionEvent};

use crate::state::AppState;

/// Count an inbound message. Always accepted: a store failure drops the
/// event (logged by the ingestor) rather than pushing back on the platform.
pub async fn message(
    State(state): State<AppState>,
    Json(event): Json<MessageEvent>,
) -> impl IntoResponse {
    state.ingestor.ingest(event).await;
    StatusCode::ACCEPTED
}

/// Route a reaction to a pending mood prompt, if one matches.
pub async fn reaction(
    State(state): State<AppState>,
    Json(event): Json<ReactionEvent>,
) -> impl IntoResponse {
    let matched = state.commands.prompts().resolve(&event);
    Json(ReactionResponse { matched })
}
