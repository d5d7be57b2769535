//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the progression engine and its collaborators.
///
/// Every failure in the engine core maps to exactly one of these variants;
/// nothing is surfaced as an unstructured error or a panic.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The story does not exist, or it has no entry node assigned yet.
    #[error("story not found: {0}")]
    StoryNotFound(Uuid),

    /// The node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(Uuid),

    /// The choice does not exist.
    #[error("choice not found: {0}")]
    ChoiceNotFound(Uuid),

    /// No save exists for this player and story.
    #[error("no active game for player {player_id} in story {story_id}")]
    NoActiveGame {
        /// The verified player identifier.
        player_id: String,
        /// The story the player has no cursor in.
        story_id: Uuid,
    },

    /// The choice cannot be applied from the player's current position:
    /// either it originates at a different node, or its target node belongs
    /// to another story.
    #[error("choice {choice_id} is not valid from node {current_node_id}")]
    InvalidChoice {
        /// The rejected choice.
        choice_id: Uuid,
        /// The node the player is currently standing on.
        current_node_id: Uuid,
    },

    /// The per-save serialization boundary detected contention that the
    /// retry budget could not resolve. The whole operation may be retried.
    #[error("transition conflict on save {save_id}")]
    Conflict {
        /// The contended save.
        save_id: Uuid,
    },

    /// The underlying store is unavailable or a transaction aborted.
    #[error("storage failure: {0}")]
    Storage(String),
}
