//! Pure domain rules for the progression engine.

pub mod transition;
