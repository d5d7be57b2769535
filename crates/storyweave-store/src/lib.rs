//! PostgreSQL adapters for the Storyweave progression engine.
//!
//! `PgStoryGraph` and `PgSaveRepository` implement the core traits against
//! the schema in `migrations/`. This is the only crate that knows SQL.

pub mod pg_save_repository;
pub mod pg_story_graph;
pub mod schema;

use storyweave_core::error::EngineError;

pub(crate) fn storage(err: sqlx::Error) -> EngineError {
    EngineError::Storage(err.to_string())
}
