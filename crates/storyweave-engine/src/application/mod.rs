//! Application layer of the progression engine: command handlers, query
//! handlers, and the statistics aggregator.

pub mod command_handlers;
pub mod query_handlers;
pub mod statistics;
