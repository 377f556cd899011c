//! CLI subcommands that inspect content without starting a server

pub mod list;
pub mod show;
