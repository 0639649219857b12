//! `bprov config` command - inspect configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::helpers::effective_config;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::LOCAL_CONFIG_FILE;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values (token masked)
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "GraphQL endpoint"),
    ("api_token", "Personal API token"),
    ("api_version", "Value sent as the API-Version header"),
    ("board_limit", "Maximum boards listed (default 100)"),
    ("default_role", "Role for invitations: guest or member"),
    ("timeout_secs", "Per-request timeout in seconds (default 30)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = effective_config(global).redacted();

    if let Some(key) = &args.key {
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None if VALID_KEYS.iter().any(|(k, _)| *k == key.as_str()) => {
                Err(miette::miette!("Key '{}' is not set", key))
            }
            None => Err(miette::miette!(
                help = "Run 'bprov config keys' to list valid keys",
                "Unknown key '{}'",
                key
            )),
        };
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&config).into_diagnostic()?);
        }
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            for (key, _) in VALID_KEYS {
                print_config_value(key, get_config_value(&config, key).as_deref());
            }

            println!();
            println!("{}", style("Config Sources (in priority order):").dim());
            println!("  1. Command-line flags (--token, --api-url)");
            println!("  2. Environment variables (BPROV_API_TOKEN, BPROV_API_URL, BPROV_DEFAULT_ROLE)");
            println!("  3. Local config ({})", LOCAL_CONFIG_FILE);
            match Config::global_config_path() {
                Some(path) => println!("  4. Global config ({})", path.display()),
                None => println!("  4. Global config (unavailable)"),
            }
        }
    }

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }
    print_path("Local:", Path::new(LOCAL_CONFIG_FILE));

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    Ok(())
}

// Helper functions

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_url" => Some(config.api_url().to_string()),
        "api_token" => config.api_token.clone(),
        "api_version" => config.api_version.clone(),
        "board_limit" => Some(config.board_limit().to_string()),
        "default_role" => Some(config.default_role().to_string()),
        "timeout_secs" => Some(config.timeout().as_secs().to_string()),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {:<15} {}", style(key).cyan(), v),
        None => println!("  {:<15} {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}
