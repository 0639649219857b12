//! CLI command implementations

pub mod boards;
pub mod completions;
pub mod config;
pub mod invite;
pub mod users;
