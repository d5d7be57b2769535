//! Routes for story progression and statistics.
//!
//! The verified player identifier arrives in the `X-Player-Id` header,
//! injected by the identity layer upstream; this crate never verifies
//! credentials itself.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::{Json, Router, routing::get, routing::post};
use tracing::{info, instrument};
use uuid::Uuid;

use storyweave_core::model::{Choice, NodeWithChoices};
use storyweave_engine::application::command_handlers::{self, ChoiceOutcome, StartedGame};
use storyweave_engine::application::query_handlers::{
    self, ActiveGame, PlayerHistoryEntry, ProgressSummary,
};
use storyweave_engine::application::statistics::{self, StoryStatistics};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// The verified player identifier extracted from the `X-Player-Id` header.
pub struct Player(pub String);

impl<S> FromRequestParts<S> for Player
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-player-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_owned()))
            .ok_or((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "missing_player_id",
                    message: "the X-Player-Id header is required".to_owned(),
                }),
            ))
    }
}

/// POST /{story_id}/start
#[instrument(skip_all, fields(player_id = %player_id, story_id = %story_id))]
async fn start_story(
    State(state): State<AppState>,
    Player(player_id): Player,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StartedGame>, ApiError> {
    info!("handling start_story");
    let started = command_handlers::start_story(
        &player_id,
        story_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(started))
}

/// GET /{story_id}/current-node
#[instrument(skip_all, fields(player_id = %player_id, story_id = %story_id))]
async fn current_node(
    State(state): State<AppState>,
    Player(player_id): Player,
    Path(story_id): Path<Uuid>,
) -> Result<Json<NodeWithChoices>, ApiError> {
    let node = query_handlers::get_current_node(
        &player_id,
        story_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(node))
}

/// GET /{story_id}/node/{node_id}/choices
///
/// Requires an active game for the story before exposing the node's
/// choices, mirroring the session check on the traversal path.
#[instrument(skip_all, fields(player_id = %player_id, story_id = %story_id, node_id = %node_id))]
async fn node_choices(
    State(state): State<AppState>,
    Player(player_id): Player,
    Path((story_id, node_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    query_handlers::get_current_node(
        &player_id,
        story_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    let choices = query_handlers::get_available_choices(node_id, state.graph.as_ref()).await?;
    Ok(Json(choices))
}

/// POST /{story_id}/choice/{choice_id}
#[instrument(skip_all, fields(player_id = %player_id, story_id = %story_id, choice_id = %choice_id))]
async fn make_choice(
    State(state): State<AppState>,
    Player(player_id): Player,
    Path((story_id, choice_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ChoiceOutcome>, ApiError> {
    info!("handling make_choice");
    let outcome = command_handlers::make_choice(
        &player_id,
        story_id,
        choice_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /games/active
#[instrument(skip_all, fields(player_id = %player_id))]
async fn active_games(
    State(state): State<AppState>,
    Player(player_id): Player,
) -> Result<Json<Vec<ActiveGame>>, ApiError> {
    let games = query_handlers::get_active_games(
        &player_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(games))
}

/// GET /player/history
#[instrument(skip_all, fields(player_id = %player_id))]
async fn player_history(
    State(state): State<AppState>,
    Player(player_id): Player,
) -> Result<Json<Vec<PlayerHistoryEntry>>, ApiError> {
    let history = query_handlers::get_player_history(
        &player_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(history))
}

/// GET /player/progress
#[instrument(skip_all, fields(player_id = %player_id))]
async fn player_progress(
    State(state): State<AppState>,
    Player(player_id): Player,
) -> Result<Json<Vec<ProgressSummary>>, ApiError> {
    let progress = query_handlers::get_user_progress(
        &player_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(progress))
}

/// GET /{story_id}/statistics
#[instrument(skip_all, fields(story_id = %story_id))]
async fn story_statistics(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryStatistics>, ApiError> {
    let stats = statistics::get_story_statistics(
        story_id,
        state.graph.as_ref(),
        state.saves.as_ref(),
    )
    .await?;
    Ok(Json(stats))
}

/// Returns the router for story progression and statistics.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games/active", get(active_games))
        .route("/player/history", get(player_history))
        .route("/player/progress", get(player_progress))
        .route("/{story_id}/start", post(start_story))
        .route("/{story_id}/current-node", get(current_node))
        .route("/{story_id}/node/{node_id}/choices", get(node_choices))
        .route("/{story_id}/choice/{choice_id}", post(make_choice))
        .route("/{story_id}/statistics", get(story_statistics))
}
