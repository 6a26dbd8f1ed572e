//! Subcommand handlers.

pub mod manuals;
pub mod roster;
