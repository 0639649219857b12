//! `bprov boards` command - list boards

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::connect;
use crate::cli::table::{render, TableRow};
use crate::core::{Board, BoardApi};

#[derive(clap::Args, Debug)]
pub struct BoardsArgs {
    /// Maximum number of boards to list (default: board_limit from config, 100)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,
}

impl TableRow for Board {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

pub fn run(args: BoardsArgs, global: &GlobalOpts) -> Result<()> {
    let (client, config) = connect(global)?;
    let limit = args.limit.unwrap_or_else(|| config.board_limit());

    let boards = client
        .list_boards(limit)
        .map_err(|e| miette::miette!("Failed to list boards: {}", e))?;

    if boards.is_empty() {
        if !global.quiet {
            println!("{}", style("No boards found.").yellow());
        }
        return Ok(());
    }

    println!("{}", render(&boards, global.format)?);
    Ok(())
}
