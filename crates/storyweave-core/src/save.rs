//! Repository abstraction over durable save state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Save, SaveChoice};

/// Result of an accepted transition: the save after the cursor moved, and
/// the order assigned to the appended history entry.
#[derive(Debug, Clone)]
pub struct AppliedTransition {
    /// The save with its new cursor, version, and timestamp.
    pub save: Save,
    /// The 1-based position of the new history entry.
    pub order: i64,
}

/// Durable store of one cursor per `(player, story)` pair and the ordered
/// choice-history log attached to each cursor.
///
/// The progression engine is the only component with write authority over
/// this state. History is appended exclusively through `apply_transition`,
/// which fuses the append with the cursor move in one atomic unit; the
/// interface deliberately offers no way to append history without moving
/// the cursor, or vice versa.
#[async_trait]
pub trait SaveRepository: Send + Sync {
    /// Looks up the cursor for a `(player, story)` pair.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn find_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
    ) -> Result<Option<Save>, EngineError>;

    /// Creates the cursor for a `(player, story)` pair, or overwrites
    /// `current_node_id` if one already exists. Bumps the version stamp and
    /// refreshes `updated_at` either way. This is the only path that may
    /// create a save.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn upsert_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
        node_id: Uuid,
    ) -> Result<Save, EngineError>;

    /// Atomically appends one history entry (with `order` one past the
    /// current maximum for the save) and moves the cursor to
    /// `next_node_id`. Both effects apply together or neither does.
    ///
    /// The compare-and-swap on `expected_version` is the per-save
    /// serialization boundary: two concurrent transitions for the same save
    /// can never both succeed against the same version, so `order` values
    /// stay contiguous and no update is lost.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Conflict` if the save's version no longer
    /// matches `expected_version`, with no effect on stored state.
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn apply_transition(
        &self,
        save_id: Uuid,
        expected_version: i64,
        choice_id: Uuid,
        next_node_id: Uuid,
    ) -> Result<AppliedTransition, EngineError>;

    /// Counts the history entries of a save.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn count_history(&self, save_id: Uuid) -> Result<i64, EngineError>;

    /// Lists the history entries of a save in ascending `order`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn list_history(&self, save_id: Uuid) -> Result<Vec<SaveChoice>, EngineError>;

    /// Lists all of a player's cursors, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn list_cursors_for_player(&self, player_id: &str) -> Result<Vec<Save>, EngineError>;

    /// Counts the saves referencing a story. Zero for an unknown story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn count_saves_for_story(&self, story_id: Uuid) -> Result<i64, EngineError>;
}
