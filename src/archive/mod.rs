//! Script archive readers for both supported dialects (spec.md §4.5).

pub mod reallive;
pub mod siglus;
