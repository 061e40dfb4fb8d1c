//! CLI command implementations

pub mod completions;
pub mod generate;
pub mod group;
pub mod utils;
