//! Test graph — an in-memory `StoryGraph` seeded through builder methods.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use storyweave_core::error::EngineError;
use storyweave_core::graph::StoryGraph;
use storyweave_core::model::{Choice, NodeWithChoices, Story, StoryNode, StorySummary};

/// An in-memory story graph for tests. Seed it with `add_story`,
/// `add_node`, `add_choice`, and `set_first_node`, then hand it to the
/// engine as a `&dyn StoryGraph`.
#[derive(Debug, Default)]
pub struct InMemoryStoryGraph {
    stories: Mutex<HashMap<Uuid, Story>>,
    nodes: Mutex<HashMap<Uuid, StoryNode>>,
    choices: Mutex<HashMap<Uuid, Choice>>,
}

impl InMemoryStoryGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a story with no entry node and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_story(&self, title: &str) -> Story {
        let story = Story {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: None,
            image_url: None,
            audio_url: None,
            first_node_id: None,
        };
        self.stories.lock().unwrap().insert(story.id, story.clone());
        story
    }

    /// Assigns the entry node of an existing story.
    ///
    /// # Panics
    ///
    /// Panics if the story was never added, or if the internal mutex is
    /// poisoned.
    pub fn set_first_node(&self, story_id: Uuid, node_id: Uuid) {
        let mut stories = self.stories.lock().unwrap();
        let story = stories.get_mut(&story_id).expect("unknown story");
        story.first_node_id = Some(node_id);
    }

    /// Adds a node to a story and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_node(&self, story_id: Uuid, content: &str) -> StoryNode {
        let node = StoryNode {
            id: Uuid::new_v4(),
            story_id,
            content: content.to_owned(),
            image_url: None,
            audio_url: None,
        };
        self.nodes.lock().unwrap().insert(node.id, node.clone());
        node
    }

    /// Adds a choice from `node_id` to `next_node_id` and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_choice(&self, node_id: Uuid, text: &str, next_node_id: Uuid) -> Choice {
        let choice = Choice {
            id: Uuid::new_v4(),
            node_id,
            text: text.to_owned(),
            next_node_id,
        };
        self.choices.lock().unwrap().insert(choice.id, choice.clone());
        choice
    }

    /// Removes a choice, as authoring-side deletion would.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove_choice(&self, choice_id: Uuid) {
        self.choices.lock().unwrap().remove(&choice_id);
    }

    /// Removes a story, as authoring-side deletion would.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove_story(&self, story_id: Uuid) {
        self.stories.lock().unwrap().remove(&story_id);
    }
}

#[async_trait]
impl StoryGraph for InMemoryStoryGraph {
    async fn first_node(&self, story_id: Uuid) -> Result<Uuid, EngineError> {
        self.stories
            .lock()
            .unwrap()
            .get(&story_id)
            .and_then(|story| story.first_node_id)
            .ok_or(EngineError::StoryNotFound(story_id))
    }

    async fn story_summary(&self, story_id: Uuid) -> Result<StorySummary, EngineError> {
        self.stories
            .lock()
            .unwrap()
            .get(&story_id)
            .map(|story| StorySummary {
                id: story.id,
                title: story.title.clone(),
                description: story.description.clone(),
            })
            .ok_or(EngineError::StoryNotFound(story_id))
    }

    async fn node_with_choices(&self, node_id: Uuid) -> Result<NodeWithChoices, EngineError> {
        let node = self
            .nodes
            .lock()
            .unwrap()
            .get(&node_id)
            .cloned()
            .ok_or(EngineError::NodeNotFound(node_id))?;
        let choices = self
            .choices
            .lock()
            .unwrap()
            .values()
            .filter(|choice| choice.node_id == node_id)
            .cloned()
            .collect();
        Ok(NodeWithChoices { node, choices })
    }

    async fn choice(&self, choice_id: Uuid) -> Result<Choice, EngineError> {
        self.choices
            .lock()
            .unwrap()
            .get(&choice_id)
            .cloned()
            .ok_or(EngineError::ChoiceNotFound(choice_id))
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn count_nodes(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let count = self
            .nodes
            .lock()
            .unwrap()
            .values()
            .filter(|node| node.story_id == story_id)
            .count();
        Ok(count as i64)
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn count_choices(&self, story_id: Uuid) -> Result<i64, EngineError> {
        let nodes = self.nodes.lock().unwrap();
        let count = self
            .choices
            .lock()
            .unwrap()
            .values()
            .filter(|choice| {
                nodes
                    .get(&choice.node_id)
                    .is_some_and(|node| node.story_id == story_id)
            })
            .count();
        Ok(count as i64)
    }
}
