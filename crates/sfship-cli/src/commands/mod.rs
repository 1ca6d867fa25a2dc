//! CLI commands

pub mod deploy;
pub mod script;
pub mod update;
