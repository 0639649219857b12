//! `bprov users` command - list the account directory

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::connect;
use crate::cli::table::{render, TableRow};
use crate::core::{BoardApi, User};

#[derive(clap::Args, Debug)]
pub struct UsersArgs {
    /// Only show accounts whose name or email contains this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl TableRow for User {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

/// Case-insensitive substring match on name or email
pub fn matches_search(user: &User, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    user.name.to_lowercase().contains(&needle) || user.email.to_lowercase().contains(&needle)
}

pub fn run(args: UsersArgs, global: &GlobalOpts) -> Result<()> {
    let (client, _config) = connect(global)?;

    let mut users = client
        .list_users()
        .map_err(|e| miette::miette!("Failed to fetch the user directory: {}", e))?;
    if let Some(ref needle) = args.search {
        users.retain(|u| matches_search(u, needle));
    }

    if users.is_empty() {
        if !global.quiet {
            println!("{}", style("No users found.").yellow());
        }
        return Ok(());
    }

    println!("{}", render(&users, global.format)?);
    Ok(())
}
