//! Domain entities for stories, their graphs, and player progression state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named graph of nodes and choices with a designated entry node.
///
/// Owned by the authoring subsystem; the engine only reads it. The entry
/// node (`first_node_id`) may be unset before any node exists, in which case
/// the story is not yet playable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional display description.
    pub description: Option<String>,
    /// Optional cover image reference.
    pub image_url: Option<String>,
    /// Optional ambient audio reference.
    pub audio_url: Option<String>,
    /// The entry node players start at, once assigned.
    pub first_node_id: Option<Uuid>,
}

/// A point in the narrative with content and zero or more outgoing choices.
///
/// Nodes with no outgoing choices are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNode {
    /// Node identifier.
    pub id: Uuid,
    /// The story this node belongs to.
    pub story_id: Uuid,
    /// Narrative content shown to the player.
    pub content: String,
    /// Optional illustration reference.
    pub image_url: Option<String>,
    /// Optional audio reference.
    pub audio_url: Option<String>,
}

/// A labeled directed edge from an origin node to a target node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Choice identifier.
    pub id: Uuid,
    /// The origin node this choice is offered at.
    pub node_id: Uuid,
    /// Label shown to the player.
    pub text: String,
    /// The target node this choice leads to.
    pub next_node_id: Uuid,
}

/// A node together with its outgoing choices, the shape traversal
/// queries return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWithChoices {
    /// The node itself.
    pub node: StoryNode,
    /// All choices originating at this node. Empty for terminal nodes.
    pub choices: Vec<Choice>,
}

/// Display fragment of a story joined into progression responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySummary {
    /// Story identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional display description.
    pub description: Option<String>,
}

/// The durable cursor recording one player's position within one story.
///
/// At most one save exists per `(player_id, story_id)` pair. `version` is
/// the optimistic-concurrency stamp: every accepted write bumps it, and
/// transitions compare-and-swap on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Save {
    /// Save identifier.
    pub id: Uuid,
    /// The verified player identifier supplied by the identity layer.
    pub player_id: String,
    /// The story being played.
    pub story_id: Uuid,
    /// The node the player is currently standing on.
    pub current_node_id: Uuid,
    /// Optimistic-concurrency version stamp.
    pub version: i64,
    /// Last time the cursor moved.
    pub updated_at: DateTime<Utc>,
}

/// One entry in a save's append-only choice log.
///
/// `order` values within one save form a contiguous 1-based sequence and
/// are never reused or renumbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveChoice {
    /// Entry identifier.
    pub id: Uuid,
    /// The save this entry belongs to.
    pub save_id: Uuid,
    /// The choice the player applied.
    pub choice_id: Uuid,
    /// Position within the save's log, starting at 1.
    pub order: i64,
}
