//! Read-only accessor over the story graph.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Choice, NodeWithChoices, StorySummary};

/// Resolves story, node, and choice identities into the graph shape the
/// progression engine needs. Pure reads; the engine never mutates graph
/// topology through this trait.
#[async_trait]
pub trait StoryGraph: Send + Sync {
    /// Resolves the entry node of a story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StoryNotFound` if the story does not exist or
    /// has no entry node assigned (not yet playable).
    async fn first_node(&self, story_id: Uuid) -> Result<Uuid, EngineError>;

    /// Returns the display summary of a story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StoryNotFound` if the story does not exist.
    async fn story_summary(&self, story_id: Uuid) -> Result<StorySummary, EngineError>;

    /// Returns a node together with its outgoing choices.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NodeNotFound` if the node does not exist.
    async fn node_with_choices(&self, node_id: Uuid) -> Result<NodeWithChoices, EngineError>;

    /// Returns a choice by id.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ChoiceNotFound` if the choice does not exist.
    async fn choice(&self, choice_id: Uuid) -> Result<Choice, EngineError>;

    /// Counts the nodes belonging to a story. Zero for an unknown story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn count_nodes(&self, story_id: Uuid) -> Result<i64, EngineError>;

    /// Counts the choices whose origin node belongs to a story. Zero for an
    /// unknown story.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the underlying store fails.
    async fn count_choices(&self, story_id: Uuid) -> Result<i64, EngineError>;
}
