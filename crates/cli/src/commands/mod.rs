//! CLI subcommands

pub mod analyze;
pub mod health;
pub mod inventory;
pub mod recommendations;
pub mod stats;
pub mod summary;
