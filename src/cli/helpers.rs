//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::Path;

use crate::cli::args::GlobalOpts;
use crate::core::config::Config;
use crate::core::GraphqlClient;

/// Load configuration and apply command-line overrides
pub fn effective_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        api_token: global.token.clone(),
        api_url: global.api_url.clone(),
        ..Default::default()
    });
    config
}

/// Build the API client from configuration plus command-line overrides
pub fn connect(global: &GlobalOpts) -> Result<(GraphqlClient, Config)> {
    let config = effective_config(global);
    let client = GraphqlClient::from_config(&config)?;
    Ok((client, config))
}

/// Read text from a file, or from stdin when the path is `-`
pub fn read_text_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a field for TSV output
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
