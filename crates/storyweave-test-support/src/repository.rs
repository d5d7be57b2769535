//! Test repositories — in-memory and failing `SaveRepository` implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use storyweave_core::clock::{Clock, SystemClock};
use storyweave_core::error::EngineError;
use storyweave_core::model::{Save, SaveChoice};
use storyweave_core::save::{AppliedTransition, SaveRepository};

#[derive(Debug, Default)]
struct State {
    saves: HashMap<Uuid, Save>,
    history: HashMap<Uuid, Vec<SaveChoice>>,
}

/// An in-memory save repository with the same transactional semantics as
/// the production store: one mutex guards both the cursors and the history
/// log, so `apply_transition` is atomic and the compare-and-swap on the
/// version stamp serializes writers per save.
pub struct InMemorySaveRepository {
    state: Mutex<State>,
    clock: Box<dyn Clock>,
}

impl Default for InMemorySaveRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySaveRepository {
    /// Creates an empty repository stamping timestamps from the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Creates an empty repository stamping timestamps from `clock`.
    #[must_use]
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    /// Returns a snapshot of a save by id, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_by_id(&self, save_id: Uuid) -> Option<Save> {
        self.state.lock().unwrap().saves.get(&save_id).cloned()
    }
}

#[async_trait]
impl SaveRepository for InMemorySaveRepository {
    async fn find_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
    ) -> Result<Option<Save>, EngineError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .saves
            .values()
            .find(|save| save.player_id == player_id && save.story_id == story_id)
            .cloned())
    }

    async fn upsert_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
        node_id: Uuid,
    ) -> Result<Save, EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        if let Some(save) = state
            .saves
            .values_mut()
            .find(|save| save.player_id == player_id && save.story_id == story_id)
        {
            save.current_node_id = node_id;
            save.version += 1;
            save.updated_at = now;
            return Ok(save.clone());
        }
        let save = Save {
            id: Uuid::new_v4(),
            player_id: player_id.to_owned(),
            story_id,
            current_node_id: node_id,
            version: 1,
            updated_at: now,
        };
        state.saves.insert(save.id, save.clone());
        Ok(save)
    }

    async fn apply_transition(
        &self,
        save_id: Uuid,
        expected_version: i64,
        choice_id: Uuid,
        next_node_id: Uuid,
    ) -> Result<AppliedTransition, EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();

        let version = state
            .saves
            .get(&save_id)
            .map(|save| save.version)
            .ok_or_else(|| EngineError::Storage(format!("save {save_id} does not exist")))?;
        if version != expected_version {
            return Err(EngineError::Conflict { save_id });
        }

        let entries = state.history.entry(save_id).or_default();
        let order = entries.last().map_or(0, |entry| entry.order) + 1;
        entries.push(SaveChoice {
            id: Uuid::new_v4(),
            save_id,
            choice_id,
            order,
        });

        let save = state.saves.get_mut(&save_id).expect("checked above");
        save.current_node_id = next_node_id;
        save.version += 1;
        save.updated_at = now;
        let save = save.clone();

        Ok(AppliedTransition { save, order })
    }

    async fn count_history(&self, save_id: Uuid) -> Result<i64, EngineError> {
        let state = self.state.lock().unwrap();
        let count = state.history.get(&save_id).map_or(0, Vec::len);
        Ok(i64::try_from(count).expect("history length fits in i64"))
    }

    async fn list_history(&self, save_id: Uuid) -> Result<Vec<SaveChoice>, EngineError> {
        let state = self.state.lock().unwrap();
        Ok(state.history.get(&save_id).cloned().unwrap_or_default())
    }

    async fn list_cursors_for_player(&self, player_id: &str) -> Result<Vec<Save>, EngineError> {
        let state = self.state.lock().unwrap();
        let mut cursors: Vec<Save> = state
            .saves
            .values()
            .filter(|save| save.player_id == player_id)
            .cloned()
            .collect();
        cursors.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(cursors)
    }

    async fn count_saves_for_story(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let state = self.state.lock().unwrap();
        let count = state
            .saves
            .values()
            .filter(|save| save.story_id == story_id)
            .count();
        Ok(i64::try_from(count).expect("save count fits in i64"))
    }
}

/// A save repository that always returns a storage failure. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSaveRepository;

fn refused() -> EngineError {
    EngineError::Storage("connection refused".into())
}

#[async_trait]
impl SaveRepository for FailingSaveRepository {
    async fn find_cursor(
        &self,
        _player_id: &str,
        _story_id: Uuid,
    ) -> Result<Option<Save>, EngineError> {
        Err(refused())
    }

    async fn upsert_cursor(
        &self,
        _player_id: &str,
        _story_id: Uuid,
        _node_id: Uuid,
    ) -> Result<Save, EngineError> {
        Err(refused())
    }

    async fn apply_transition(
        &self,
        _save_id: Uuid,
        _expected_version: i64,
        _choice_id: Uuid,
        _next_node_id: Uuid,
    ) -> Result<AppliedTransition, EngineError> {
        Err(refused())
    }

    async fn count_history(&self, _save_id: Uuid) -> Result<i64, EngineError> {
        Err(refused())
    }

    async fn list_history(&self, _save_id: Uuid) -> Result<Vec<SaveChoice>, EngineError> {
        Err(refused())
    }

    async fn list_cursors_for_player(&self, _player_id: &str) -> Result<Vec<Save>, EngineError> {
        Err(refused())
    }

    async fn count_saves_for_story(&self, _story_id: Uuid) -> Result<i64, EngineError> {
        Err(refused())
    }
}
