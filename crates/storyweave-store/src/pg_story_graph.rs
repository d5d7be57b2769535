//! `PostgreSQL` implementation of the `StoryGraph` trait.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::graph::StoryGraph;
use storyweave_core::model::{Choice, NodeWithChoices, StoryNode, StorySummary};

use crate::storage;

/// PostgreSQL-backed read accessor over the story graph tables.
#[derive(Debug, Clone)]
pub struct PgStoryGraph {
    pool: PgPool,
}

impl PgStoryGraph {
    /// Creates a new `PgStoryGraph`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: Uuid,
    story_id: Uuid,
    content: String,
    image_url: Option<String>,
    audio_url: Option<String>,
}

impl From<NodeRow> for StoryNode {
    fn from(row: NodeRow) -> Self {
        Self {
            id: row.id,
            story_id: row.story_id,
            content: row.content,
            image_url: row.image_url,
            audio_url: row.audio_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChoiceRow {
    id: Uuid,
    node_id: Uuid,
    text: String,
    next_node_id: Uuid,
}

impl From<ChoiceRow> for Choice {
    fn from(row: ChoiceRow) -> Self {
        Self {
            id: row.id,
            node_id: row.node_id,
            text: row.text,
            next_node_id: row.next_node_id,
        }
    }
}

#[async_trait]
impl StoryGraph for PgStoryGraph {
    async fn first_node(&self, story_id: Uuid) -> Result<Uuid, EngineError> {
        let row: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT first_node_id FROM stories WHERE id = $1")
                .bind(story_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;

        // A story without an entry node is not playable; callers see the
        // same failure as for a missing story.
        row.and_then(|(first_node_id,)| first_node_id)
            .ok_or(EngineError::StoryNotFound(story_id))
    }

    async fn story_summary(&self, story_id: Uuid) -> Result<StorySummary, EngineError> {
        let row: Option<(Uuid, String, Option<String>)> =
            sqlx::query_as("SELECT id, title, description FROM stories WHERE id = $1")
                .bind(story_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;

        row.map(|(id, title, description)| StorySummary {
            id,
            title,
            description,
        })
        .ok_or(EngineError::StoryNotFound(story_id))
    }

    async fn node_with_choices(&self, node_id: Uuid) -> Result<NodeWithChoices, EngineError> {
        let node: Option<NodeRow> = sqlx::query_as(
            "SELECT id, story_id, content, image_url, audio_url
             FROM story_nodes WHERE id = $1",
        )
        .bind(node_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        let node = node.ok_or(EngineError::NodeNotFound(node_id))?;

        let choices: Vec<ChoiceRow> = sqlx::query_as(
            "SELECT id, node_id, text, next_node_id
             FROM choices WHERE node_id = $1
             ORDER BY id",
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(NodeWithChoices {
            node: node.into(),
            choices: choices.into_iter().map(Choice::from).collect(),
        })
    }

    async fn choice(&self, choice_id: Uuid) -> Result<Choice, EngineError> {
        let row: Option<ChoiceRow> = sqlx::query_as(
            "SELECT id, node_id, text, next_node_id FROM choices WHERE id = $1",
        )
        .bind(choice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.map(Choice::from)
            .ok_or(EngineError::ChoiceNotFound(choice_id))
    }

    async fn count_nodes(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM story_nodes WHERE story_id = $1")
                .bind(story_id)
                .fetch_one(&self.pool)
                .await
                .map_err(storage)?;
        Ok(count)
    }

    async fn count_choices(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM choices c
             JOIN story_nodes n ON n.id = c.node_id
             WHERE n.story_id = $1",
        )
        .bind(story_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(count)
    }
}
