//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    boards::BoardsArgs, completions::CompletionsArgs, config::ConfigCommands, invite::InviteArgs,
    users::UsersArgs,
};

#[derive(Parser)]
#[command(name = "bprov")]
#[command(author, version, about = "Bulk board provisioning")]
#[command(long_about = "Invite people by email, or pick existing accounts, and add all of them to a set of boards in one pass.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// API token (overrides BPROV_API_TOKEN and config files)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// GraphQL endpoint (overrides BPROV_API_URL and config files)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List boards available to the token
    Boards(BoardsArgs),

    /// List accounts in the directory
    Users(UsersArgs),

    /// Invite emails and add users to boards
    Invite(InviteArgs),

    /// Show effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for lists, summary for runs)
    #[default]
    Auto,
    /// Human-readable text
    Text,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
}
