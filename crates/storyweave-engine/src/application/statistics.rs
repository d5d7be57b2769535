//! Statistics aggregator.
//!
//! Read-only counts derived from the graph and save records. The three
//! counts are independent reads, each individually accurate at its own
//! read time; they are not taken inside one snapshot, so callers must not
//! assume they form a cross-consistent picture under concurrent writes.

use serde::Serialize;
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::graph::StoryGraph;
use storyweave_core::save::SaveRepository;

/// Aggregate counts for one story.
#[derive(Debug, Clone, Serialize)]
pub struct StoryStatistics {
    /// Nodes belonging to the story.
    pub node_count: i64,
    /// Choices whose origin node belongs to the story.
    pub choice_count: i64,
    /// Saves referencing the story.
    pub save_count: i64,
}

/// Counts nodes, choices, and saves for a story. All counts are zero for a
/// story the store has never seen.
///
/// # Errors
///
/// Returns `EngineError::Storage` if the underlying store fails.
pub async fn get_story_statistics(
    story_id: Uuid,
    graph: &dyn StoryGraph,
    saves: &dyn SaveRepository,
) -> Result<StoryStatistics, EngineError> {
    let node_count = graph.count_nodes(story_id).await?;
    let choice_count = graph.count_choices(story_id).await?;
    let save_count = saves.count_saves_for_story(story_id).await?;

    Ok(StoryStatistics {
        node_count,
        choice_count,
        save_count,
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use storyweave_test_support::{InMemorySaveRepository, InMemoryStoryGraph};

    use crate::application::command_handlers::start_story;
    use crate::application::statistics::get_story_statistics;

    #[tokio::test]
    async fn test_statistics_counts_nodes_choices_and_saves() {
        // Arrange — 3 nodes, 5 choices among them, 2 saves.
        let graph = InMemoryStoryGraph::new();
        let story = graph.add_story("The Hollow Lighthouse");
        let n1 = graph.add_node(story.id, "Shore.");
        let n2 = graph.add_node(story.id, "Stairs.");
        let n3 = graph.add_node(story.id, "Lamp room.");
        graph.set_first_node(story.id, n1.id);
        graph.add_choice(n1.id, "Climb", n2.id);
        graph.add_choice(n1.id, "Wait", n1.id);
        graph.add_choice(n2.id, "Keep climbing", n3.id);
        graph.add_choice(n2.id, "Turn back", n1.id);
        graph.add_choice(n3.id, "Descend", n1.id);

        let saves = InMemorySaveRepository::new();
        start_story("player-1", story.id, &graph, &saves)
            .await
            .unwrap();
        start_story("player-2", story.id, &graph, &saves)
            .await
            .unwrap();

        // Act
        let stats = get_story_statistics(story.id, &graph, &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.choice_count, 5);
        assert_eq!(stats.save_count, 2);
    }

    #[tokio::test]
    async fn test_statistics_are_zero_for_unknown_story() {
        // Arrange
        let graph = InMemoryStoryGraph::new();
        let saves = InMemorySaveRepository::new();

        // Act
        let stats = get_story_statistics(Uuid::new_v4(), &graph, &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.choice_count, 0);
        assert_eq!(stats.save_count, 0);
    }

    #[tokio::test]
    async fn test_statistics_do_not_count_neighboring_stories() {
        // Arrange — a second story must not bleed into the first's counts.
        let graph = InMemoryStoryGraph::new();
        let story = graph.add_story("First");
        let other = graph.add_story("Second");
        graph.add_node(story.id, "Here.");
        let m1 = graph.add_node(other.id, "There.");
        let m2 = graph.add_node(other.id, "Further.");
        graph.add_choice(m1.id, "On", m2.id);
        graph.set_first_node(other.id, m1.id);

        let saves = InMemorySaveRepository::new();
        start_story("player-1", other.id, &graph, &saves)
            .await
            .unwrap();

        // Act
        let stats = get_story_statistics(story.id, &graph, &saves)
            .await
            .unwrap();

        // Assert
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.choice_count, 0);
        assert_eq!(stats.save_count, 0);
    }
}
