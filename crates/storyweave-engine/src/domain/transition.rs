//! Transition validity rules.

use storyweave_core::error::EngineError;
use storyweave_core::model::{Choice, Save, StoryNode};

/// Checks that `choice` may be applied to `save`, where `target` is the
/// node the choice points at.
///
/// A choice is applicable only when it originates at the node the save
/// currently points to; knowing a choice id is not enough to apply it
/// from elsewhere in the graph. The target must also belong to the save's
/// story: authoring does not guarantee that, and a cross-story target is a
/// data-integrity fault surfaced here rather than silently followed.
///
/// # Errors
///
/// Returns `EngineError::InvalidChoice` if either rule is violated.
pub fn validate(save: &Save, choice: &Choice, target: &StoryNode) -> Result<(), EngineError> {
    if choice.node_id != save.current_node_id {
        return Err(EngineError::InvalidChoice {
            choice_id: choice.id,
            current_node_id: save.current_node_id,
        });
    }
    if target.story_id != save.story_id {
        return Err(EngineError::InvalidChoice {
            choice_id: choice.id,
            current_node_id: save.current_node_id,
        });
    }
    Ok(())
}
