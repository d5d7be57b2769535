//! `PostgreSQL` implementation of the `SaveRepository` trait.
//!
//! The transition path relies on a compare-and-swap over `saves.version`
//! inside one transaction: the `UPDATE .. WHERE version = $expected` takes
//! the row lock, so the order assignment that follows reads a settled
//! maximum. The `UNIQUE (save_id, choice_order)` constraint backs the
//! gapless-order invariant even against out-of-band writers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::model::{Save, SaveChoice};
use storyweave_core::save::{AppliedTransition, SaveRepository};

use crate::storage;

/// PostgreSQL-backed store of cursors and choice history.
#[derive(Debug, Clone)]
pub struct PgSaveRepository {
    pool: PgPool,
}

impl PgSaveRepository {
    /// Creates a new `PgSaveRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SAVE_COLUMNS: &str = "id, player_id, story_id, current_node_id, version, updated_at";

#[derive(sqlx::FromRow)]
struct SaveRow {
    id: Uuid,
    player_id: String,
    story_id: Uuid,
    current_node_id: Uuid,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl From<SaveRow> for Save {
    fn from(row: SaveRow) -> Self {
        Self {
            id: row.id,
            player_id: row.player_id,
            story_id: row.story_id,
            current_node_id: row.current_node_id,
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SaveChoiceRow {
    id: Uuid,
    save_id: Uuid,
    choice_id: Uuid,
    #[sqlx(rename = "choice_order")]
    order: i64,
}

impl From<SaveChoiceRow> for SaveChoice {
    fn from(row: SaveChoiceRow) -> Self {
        Self {
            id: row.id,
            save_id: row.save_id,
            choice_id: row.choice_id,
            order: row.order,
        }
    }
}

#[async_trait]
impl SaveRepository for PgSaveRepository {
    async fn find_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
    ) -> Result<Option<Save>, EngineError> {
        let row: Option<SaveRow> = sqlx::query_as(&format!(
            "SELECT {SAVE_COLUMNS} FROM saves WHERE player_id = $1 AND story_id = $2"
        ))
        .bind(player_id)
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.map(Save::from))
    }

    async fn upsert_cursor(
        &self,
        player_id: &str,
        story_id: Uuid,
        node_id: Uuid,
    ) -> Result<Save, EngineError> {
        // The unique (player_id, story_id) constraint makes this the only
        // creation path and keeps the pair singular under concurrency.
        let row: SaveRow = sqlx::query_as(&format!(
            "INSERT INTO saves (id, player_id, story_id, current_node_id, version, updated_at)
             VALUES ($1, $2, $3, $4, 1, NOW())
             ON CONFLICT (player_id, story_id)
             DO UPDATE SET current_node_id = EXCLUDED.current_node_id,
                           version = saves.version + 1,
                           updated_at = NOW()
             RETURNING {SAVE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(player_id)
        .bind(story_id)
        .bind(node_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.into())
    }

    async fn apply_transition(
        &self,
        save_id: Uuid,
        expected_version: i64,
        choice_id: Uuid,
        next_node_id: Uuid,
    ) -> Result<AppliedTransition, EngineError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row: Option<SaveRow> = sqlx::query_as(&format!(
            "UPDATE saves
             SET current_node_id = $3, version = version + 1, updated_at = NOW()
             WHERE id = $1 AND version = $2
             RETURNING {SAVE_COLUMNS}"
        ))
        .bind(save_id)
        .bind(expected_version)
        .bind(next_node_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;

        let Some(row) = row else {
            // Distinguish a stale version stamp from a vanished row. The
            // transaction is dropped either way, leaving no effect.
            let existing: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM saves WHERE id = $1")
                    .bind(save_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(storage)?;
            return Err(match existing {
                Some(_) => EngineError::Conflict { save_id },
                None => EngineError::Storage(format!("save {save_id} does not exist")),
            });
        };

        let (order,): (i64,) = sqlx::query_as(
            "INSERT INTO save_choices (id, save_id, choice_id, choice_order)
             SELECT $1, $2, $3, COALESCE(MAX(choice_order), 0) + 1
             FROM save_choices WHERE save_id = $2
             RETURNING choice_order",
        )
        .bind(Uuid::new_v4())
        .bind(save_id)
        .bind(choice_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        Ok(AppliedTransition {
            save: row.into(),
            order,
        })
    }

    async fn count_history(&self, save_id: Uuid) -> Result<i64, EngineError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM save_choices WHERE save_id = $1")
                .bind(save_id)
                .fetch_one(&self.pool)
                .await
                .map_err(storage)?;
        Ok(count)
    }

    async fn list_history(&self, save_id: Uuid) -> Result<Vec<SaveChoice>, EngineError> {
        let rows: Vec<SaveChoiceRow> = sqlx::query_as(
            "SELECT id, save_id, choice_id, choice_order
             FROM save_choices WHERE save_id = $1
             ORDER BY choice_order ASC",
        )
        .bind(save_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(SaveChoice::from).collect())
    }

    async fn list_cursors_for_player(&self, player_id: &str) -> Result<Vec<Save>, EngineError> {
        let rows: Vec<SaveRow> = sqlx::query_as(&format!(
            "SELECT {SAVE_COLUMNS} FROM saves WHERE player_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(Save::from).collect())
    }

    async fn count_saves_for_story(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM saves WHERE story_id = $1")
            .bind(story_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(count)
    }
}
