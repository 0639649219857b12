//! `bprov completions` command - shell completion scripts
//!
//! ```bash
//! source <(bprov completions bash)
//! bprov completions fish > ~/.config/fish/completions/bprov.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

const BIN_NAME: &str = "bprov";

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}

/// Write the completion script for `shell` covering every bprov subcommand
fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}
