//! Shared application state.

use std::sync::Arc;

use storyweave_core::graph::StoryGraph;
use storyweave_core::save::SaveRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-only accessor over the story graph.
    pub graph: Arc<dyn StoryGraph>,
    /// Durable store of cursors and choice history.
    pub saves: Arc<dyn SaveRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(graph: Arc<dyn StoryGraph>, saves: Arc<dyn SaveRepository>) -> Self {
        Self { graph, saves }
    }
}
