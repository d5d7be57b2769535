//! Progression store database schema.

/// SQL creating the story graph and save tables. Applied by the
/// `migrations/` directory; exposed here for embedded setups and tooling.
pub const CREATE_PROGRESSION_TABLES: &str =
    include_str!("../../../migrations/0001_create_progression_tables.sql");
