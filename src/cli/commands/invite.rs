//! `bprov invite` command - provision users onto boards
//!
//! Collects the boards, existing users, email text and role (from flags or
//! interactively), hands them to the provisioning engine and prints the
//! outcome summary.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect, Select};
use miette::{bail, IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{effective_config, read_text_input};
use crate::cli::OutputFormat;
use crate::core::{
    parse_email_list, Board, BoardApi, BoardId, GraphqlClient, ProvisionRequest,
    ProvisioningOutcome, Provisioner, RoleSelection, User, ValidationFailure,
};

#[derive(clap::Args, Debug)]
pub struct InviteArgs {
    /// Board IDs to add users to (repeatable or comma-separated)
    #[arg(long = "board", short = 'b', value_delimiter = ',')]
    pub boards: Vec<String>,

    /// Existing user IDs to add (repeatable or comma-separated)
    #[arg(long = "user", short = 'u', value_delimiter = ',')]
    pub users: Vec<String>,

    /// Email addresses, separated by commas or newlines
    #[arg(long, short = 'e')]
    pub emails: Vec<String>,

    /// Read email addresses from a file (- for stdin)
    #[arg(long)]
    pub emails_file: Option<PathBuf>,

    /// Role for newly invited users (default: default_role from config)
    #[arg(long, short = 'r')]
    pub role: Option<RoleSelection>,

    /// Pick boards and role interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Skip the confirmation prompt in interactive mode
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be done without calling the API
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: InviteArgs, global: &GlobalOpts) -> Result<()> {
    let config = effective_config(global);

    let raw_email_list = collect_email_text(&args)?;
    let mut role = args.role.unwrap_or_else(|| config.default_role());
    let mut board_ids: Vec<BoardId> = args
        .boards
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(BoardId::from)
        .collect();
    let user_ids: Vec<&str> = args
        .users
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();

    // Reject empty input before touching the API
    let emails = preflight(&user_ids, &raw_email_list, &board_ids, args.interactive)?;

    if args.dry_run {
        print_plan(&board_ids, &user_ids, &emails, role);
        return Ok(());
    }

    let client = GraphqlClient::from_config(&config)?;

    if args.interactive {
        let boards = client
            .list_boards(config.board_limit())
            .map_err(|e| miette::miette!("Failed to list boards: {}", e))?;
        board_ids = pick_boards(&boards, &board_ids)?;
        role = pick_role(role)?;
    }

    let selected_users = lookup_users(&client, &user_ids)?;
    let request = ProvisionRequest {
        selected_users,
        raw_email_list,
        selected_boards: board_ids,
        role,
    };
    request.validate()?;

    if args.interactive && !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Add {} identities to {} boards?",
                request.selected_users.len() + emails.len(),
                request.selected_boards.len()
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let provisioner = Provisioner::new(client);
    let outcome = provisioner
        .provision(&request)
        .map_err(|e| miette::Report::new(e).wrap_err("Error adding users to boards"))?;

    print_outcome(&outcome, global)
}

/// Join `--emails` values and the optional emails file into one text blob
fn collect_email_text(args: &InviteArgs) -> Result<String> {
    let mut text = args.emails.join("\n");
    if let Some(ref path) = args.emails_file {
        let contents = read_text_input(path)?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&contents);
    }
    Ok(text)
}

/// Validate flags before any remote call, returning the parsed emails
fn preflight(
    user_ids: &[&str],
    raw_email_list: &str,
    board_ids: &[BoardId],
    interactive: bool,
) -> Result<Vec<String>, ValidationFailure> {
    let emails = parse_email_list(raw_email_list);
    if user_ids.is_empty() && emails.is_empty() {
        return Err(ValidationFailure::NoIdentities);
    }
    if board_ids.is_empty() && !interactive {
        return Err(ValidationFailure::NoBoards);
    }
    Ok(emails)
}

/// Resolve `--user` ids to directory entries
fn lookup_users<A: BoardApi>(api: &A, user_ids: &[&str]) -> Result<Vec<User>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let directory = api
        .list_users()
        .map_err(|e| miette::miette!("Failed to fetch the user directory: {}", e))?;

    let mut selected = Vec::with_capacity(user_ids.len());
    let mut unknown = Vec::new();
    for id in user_ids {
        match directory.iter().find(|u| u.id.as_str() == *id) {
            Some(user) => selected.push(user.clone()),
            None => unknown.push(*id),
        }
    }

    if !unknown.is_empty() {
        bail!(
            help = "Run 'bprov users' to list valid ids",
            "Unknown user id(s): {}",
            unknown.join(", ")
        );
    }
    Ok(selected)
}

fn pick_boards(boards: &[Board], preselected: &[BoardId]) -> Result<Vec<BoardId>> {
    if boards.is_empty() {
        bail!("No boards available to this token");
    }

    let items: Vec<String> = boards
        .iter()
        .map(|b| format!("{}  (ID: {})", b.name, b.id))
        .collect();
    let defaults: Vec<bool> = boards
        .iter()
        .map(|b| preselected.contains(&b.id))
        .collect();

    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select boards (space to toggle, enter to confirm)")
        .items(&items)
        .defaults(&defaults)
        .interact()
        .into_diagnostic()?;

    Ok(picked.into_iter().map(|i| boards[i].id.clone()).collect())
}

fn pick_role(current: RoleSelection) -> Result<RoleSelection> {
    let roles = [RoleSelection::Guest, RoleSelection::Member];
    let default_idx = roles.iter().position(|r| *r == current).unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Role for new users")
        .items(&["Guest", "Member"])
        .default(default_idx)
        .interact()
        .into_diagnostic()?;

    Ok(roles[selection])
}

fn print_plan(board_ids: &[BoardId], user_ids: &[&str], emails: &[String], role: RoleSelection) {
    let boards: Vec<String> = board_ids.iter().map(|b| b.to_string()).collect();

    println!("{}", style("Dry run - no changes made").yellow());
    println!("  {:<8} {}", style("Boards:").cyan(), boards.join(", "));
    if !user_ids.is_empty() {
        println!("  {:<8} {}", style("Users:").cyan(), user_ids.join(", "));
    }
    if !emails.is_empty() {
        println!("  {:<8} {}", style("Emails:").cyan(), emails.join(", "));
    }
    println!("  {:<8} {}", style("Role:").cyan(), role);
}

fn print_outcome(outcome: &ProvisioningOutcome, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(outcome).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (bucket, entries) in outcome.sections() {
                for entry in entries {
                    println!("{}\t{}", bucket.label().to_lowercase(), entry);
                }
            }
        }
        OutputFormat::Auto | OutputFormat::Text => {
            print!("{}", styled_summary(&outcome.render_summary()));
        }
    }
    Ok(())
}

/// Colour the headings of a rendered summary
fn styled_summary(summary: &str) -> String {
    let mut out = String::new();
    for line in summary.lines() {
        let styled = match line.split_once(": ") {
            Some((label, entries)) => {
                let label = match label {
                    "Added" => style(label).green(),
                    "Invited" => style(label).cyan(),
                    _ => style(label).red(),
                };
                format!("{}: {}", label, entries)
            }
            None => format!("{} {}", style("✓").green(), style(line).bold()),
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::testing::{user, FakeApi};

    #[test]
    fn test_preflight_requires_identities() {
        let boards = vec![BoardId::new("b1")];
        assert_eq!(
            preflight(&[], " ,\n", &boards, false),
            Err(ValidationFailure::NoIdentities)
        );
        assert_eq!(preflight(&["u1"], "", &boards, false), Ok(vec![]));
    }

    #[test]
    fn test_preflight_boards_optional_when_interactive() {
        assert_eq!(
            preflight(&[], "a@x.com", &[], false),
            Err(ValidationFailure::NoBoards)
        );
        assert_eq!(
            preflight(&[], "a@x.com", &[], true),
            Ok(vec!["a@x.com".to_string()])
        );
    }

    #[test]
    fn test_lookup_users_skips_directory_when_none() {
        let api = FakeApi::default();
        assert!(lookup_users(&api, &[]).unwrap().is_empty());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_lookup_users_keeps_order_and_rejects_unknown() {
        let api = FakeApi::with_users(vec![
            user("1", "Ada", "ada@x.com"),
            user("2", "Bea", "bea@x.com"),
        ]);
        let found = lookup_users(&api, &["2", "1"]).unwrap();
        assert_eq!(found[0].name, "Bea");
        assert_eq!(found[1].name, "Ada");

        let err = lookup_users(&api, &["1", "9"]).unwrap_err();
        assert!(err.to_string().contains("9"));
    }

    #[test]
    fn test_styled_summary_keeps_rendered_text() {
        console::set_colors_enabled(false);
        let summary = "Completed\nAdded: a@x.com, b@x.com\nFailed: c@x.com\n";
        assert_eq!(
            styled_summary(summary),
            "✓ Completed\nAdded: a@x.com, b@x.com\nFailed: c@x.com\n"
        );
    }
}
