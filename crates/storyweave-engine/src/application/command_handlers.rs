//! Command handlers for the progression engine.
//!
//! This module contains the application-level functions that mutate player
//! progression state: load the cursor, validate the transition against the
//! graph, and persist both effects through the save repository's atomic
//! primitive.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::graph::StoryGraph;
use storyweave_core::model::{Save, StorySummary};
use storyweave_core::save::SaveRepository;

use crate::domain::transition;

/// Attempts per `make_choice` call before contention is surfaced as
/// `EngineError::Conflict`. Each retry re-loads the cursor and re-validates
/// the choice against it.
const TRANSITION_RETRY_BUDGET: u32 = 3;

/// Response to a successful `start_story`: the (possibly reset) cursor plus
/// the story summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct StartedGame {
    /// The cursor, positioned at the story's entry node.
    pub save: Save,
    /// Title and description of the story being played.
    pub story: StorySummary,
}

/// Acknowledgement of an accepted transition.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOutcome {
    /// The save the transition was applied to.
    pub save_id: Uuid,
    /// The choice that was applied.
    pub choice_id: Uuid,
    /// Position of the new history entry within the save's log.
    pub order: i64,
    /// The node the cursor now points to.
    pub current_node_id: Uuid,
}

/// Starts (or restarts) a story for a player.
///
/// Creates the cursor on first call; every later call for the same pair is
/// an explicit restart that moves the existing cursor back to the entry
/// node. History is intentionally not cleared on restart: it is a full
/// play log, not a per-attempt log.
///
/// # Errors
///
/// Returns `EngineError::StoryNotFound` if the story does not exist or has
/// no entry node, and `EngineError::Storage` if persistence fails.
pub async fn start_story(
    player_id: &str,
    story_id: Uuid,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<StartedGame, EngineError> {
    let first_node_id = graph.first_node(story_id).await?;
    let story = graph.story_summary(story_id).await?;
    let save = saves.upsert_cursor(player_id, story_id, first_node_id).await?;

    info!(%story_id, save_id = %save.id, node_id = %first_node_id, "story started");

    Ok(StartedGame { save, story })
}

/// Applies a choice to a player's cursor: appends the choice to the save's
/// history and moves the cursor to the choice's target node, atomically.
///
/// The transition is guarded by a compare-and-swap on the save's version
/// stamp. On contention the handler re-loads the cursor, re-validates the
/// choice against the fresh position, and retries within a small budget; a
/// choice that became stale in the meantime fails `InvalidChoice` rather
/// than being applied from the wrong node.
///
/// # Errors
///
/// Returns `EngineError::NoActiveGame` if the player has no cursor for the
/// story, `EngineError::ChoiceNotFound` if the choice does not exist,
/// `EngineError::NodeNotFound` if its target node is dangling,
/// `EngineError::InvalidChoice` if the choice does not originate at the
/// current node or targets another story, `EngineError::Conflict` if the
/// retry budget is exhausted, and `EngineError::Storage` on persistence
/// failure.
pub async fn make_choice(
    player_id: &str,
    story_id: Uuid,
    choice_id: Uuid,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<ChoiceOutcome, EngineError> {
    let mut save = load_cursor(player_id, story_id, saves).await?;
    let choice = graph.choice(choice_id).await?;
    let target = graph.node_with_choices(choice.next_node_id).await?.node;

    let mut attempts = 0;
    loop {
        transition::validate(&save, &choice, &target)?;

        match saves
            .apply_transition(save.id, save.version, choice_id, choice.next_node_id)
            .await
        {
            Ok(applied) => {
                info!(
                    save_id = %applied.save.id,
                    %choice_id,
                    order = applied.order,
                    node_id = %applied.save.current_node_id,
                    "transition applied"
                );
                return Ok(ChoiceOutcome {
                    save_id: applied.save.id,
                    choice_id,
                    order: applied.order,
                    current_node_id: applied.save.current_node_id,
                });
            }
            Err(EngineError::Conflict { save_id }) => {
                attempts += 1;
                if attempts >= TRANSITION_RETRY_BUDGET {
                    warn!(%save_id, attempts, "transition retry budget exhausted");
                    return Err(EngineError::Conflict { save_id });
                }
                save = load_cursor(player_id, story_id, saves).await?;
            }
            Err(other) => return Err(other),
        }
    }
}

async fn load_cursor(
    player_id: &str,
    story_id: Uuid,
    saves: &dyn SaveRepository,
) -> Result<Save, EngineError> {
    saves
        .find_cursor(player_id, story_id)
        .await?
        .ok_or_else(|| EngineError::NoActiveGame {
            player_id: player_id.to_owned(),
            story_id,
        })
}
