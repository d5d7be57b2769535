//! Query handlers for the progression engine.
//!
//! Read-only views over cursors, history, and the graph. Nothing here
//! mutates state; the save row remains the single authoritative record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::graph::StoryGraph;
use storyweave_core::model::{Choice, NodeWithChoices, Save, StorySummary};
use storyweave_core::save::SaveRepository;

/// One applied choice within a player's history view.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceLogEntry {
    /// The applied choice.
    pub choice_id: Uuid,
    /// Position within the save's log.
    pub order: i64,
    /// The choice's label, or `None` if authoring has since deleted it.
    pub text: Option<String>,
}

/// A player's full play log for one story.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerHistoryEntry {
    /// The story this log belongs to.
    pub story: StorySummary,
    /// The save the log is attached to.
    pub save_id: Uuid,
    /// Last cursor movement.
    pub updated_at: DateTime<Utc>,
    /// Applied choices in ascending order.
    pub choices: Vec<ChoiceLogEntry>,
}

/// Lightweight per-story progress summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    /// The story being played.
    pub story_id: Uuid,
    /// The story's title, or `None` if it has since been deleted.
    pub story_title: Option<String>,
    /// The node the cursor points to.
    pub current_node_id: Uuid,
    /// Number of choices applied so far.
    pub choices_count: i64,
    /// Last cursor movement.
    pub updated_at: DateTime<Utc>,
}

/// A cursor joined with its story summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveGame {
    /// The cursor.
    pub save: Save,
    /// The story being played.
    pub story: StorySummary,
}

/// Returns the node the player currently stands on, with its outgoing
/// choices.
///
/// # Errors
///
/// Returns `EngineError::NoActiveGame` if the player has no cursor for the
/// story, and `EngineError::NodeNotFound` if the cursor points at a node
/// that no longer exists.
pub async fn get_current_node(
    player_id: &str,
    story_id: Uuid,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<NodeWithChoices, EngineError> {
    let save = saves
        .find_cursor(player_id, story_id)
        .await?
        .ok_or_else(|| EngineError::NoActiveGame {
            player_id: player_id.to_owned(),
            story_id,
        })?;
    graph.node_with_choices(save.current_node_id).await
}

/// Returns the choices available at a node. No session state is involved;
/// callers that already hold a node id can skip `get_current_node`.
///
/// # Errors
///
/// Returns `EngineError::NodeNotFound` if the node does not exist.
pub async fn get_available_choices(
    node_id: Uuid,
    graph: &dyn StoryGraph,
) -> Result<Vec<Choice>, EngineError> {
    Ok(graph.node_with_choices(node_id).await?.choices)
}

/// Returns the player's play logs across all stories, most recently
/// updated story first. Choice labels are resolved through the graph; a
/// label that authoring has since deleted is reported as `None` rather
/// than failing the whole view.
///
/// # Errors
///
/// Returns `EngineError::StoryNotFound` if a save references a story the
/// graph no longer resolves, and `EngineError::Storage` on store failure.
pub async fn get_player_history(
    player_id: &str,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<Vec<PlayerHistoryEntry>, EngineError> {
    let cursors = saves.list_cursors_for_player(player_id).await?;
    let mut entries = Vec::with_capacity(cursors.len());

    for save in cursors {
        let story = graph.story_summary(save.story_id).await?;
        let history = saves.list_history(save.id).await?;

        let mut choices = Vec::with_capacity(history.len());
        for applied in history {
            let text = match graph.choice(applied.choice_id).await {
                Ok(choice) => Some(choice.text),
                Err(EngineError::ChoiceNotFound(_)) => None,
                Err(other) => return Err(other),
            };
            choices.push(ChoiceLogEntry {
                choice_id: applied.choice_id,
                order: applied.order,
                text,
            });
        }

        entries.push(PlayerHistoryEntry {
            story,
            save_id: save.id,
            updated_at: save.updated_at,
            choices,
        });
    }

    Ok(entries)
}

/// Returns one progress summary per save the player holds, most recently
/// updated first.
///
/// # Errors
///
/// Returns `EngineError::Storage` on store failure.
pub async fn get_user_progress(
    player_id: &str,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<Vec<ProgressSummary>, EngineError> {
    let cursors = saves.list_cursors_for_player(player_id).await?;
    let mut summaries = Vec::with_capacity(cursors.len());

    for save in cursors {
        let story_title = match graph.story_summary(save.story_id).await {
            Ok(summary) => Some(summary.title),
            Err(EngineError::StoryNotFound(_)) => None,
            Err(other) => return Err(other),
        };
        let choices_count = saves.count_history(save.id).await?;
        summaries.push(ProgressSummary {
            story_id: save.story_id,
            story_title,
            current_node_id: save.current_node_id,
            choices_count,
            updated_at: save.updated_at,
        });
    }

    Ok(summaries)
}

/// Returns the player's cursors joined with their story summaries, most
/// recently updated first.
///
/// # Errors
///
/// Returns `EngineError::StoryNotFound` if a save references a story the
/// graph no longer resolves, and `EngineError::Storage` on store failure.
pub async fn get_active_games(
    player_id: &str,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<Vec<ActiveGame>, EngineError> {
    let cursors = saves.list_cursors_for_player(player_id).await?;
    let mut games = Vec::with_capacity(cursors.len());

    for save in cursors {
        let story = graph.story_summary(save.story_id).await?;
        games.push(ActiveGame { save, story });
    }

    Ok(games)
}
