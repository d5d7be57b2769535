//! Storyweave — Progression Engine bounded context.
//!
//! The engine treats a story as a directed graph, maintains one durable
//! cursor per `(player, story)` pair, and owns every rule about which
//! transitions are valid and how they are applied. It reads the graph
//! through [`storyweave_core::graph::StoryGraph`] and is the only component
//! with write authority over save state, which it reaches through
//! [`storyweave_core::save::SaveRepository`].

pub mod application;
pub mod domain;
