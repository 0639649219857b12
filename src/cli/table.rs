//! Table formatting for CLI list commands
//!
//! Lists print as a table on a terminal, TSV for piping, or JSON/YAML for
//! programs.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_tsv, truncate_str};
use crate::cli::OutputFormat;

/// Widest a table cell may get before it is truncated
const MAX_CELL_WIDTH: usize = 48;

/// A record that can be printed as a table row
pub trait TableRow: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Render rows in the requested format
pub fn render<T: TableRow>(rows: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows).into_diagnostic(),
        OutputFormat::Yaml => serde_yml::to_string(&rows).into_diagnostic(),
        OutputFormat::Tsv => Ok(render_tsv(rows)),
        OutputFormat::Auto | OutputFormat::Text => Ok(render_table(rows)),
    }
}

fn render_tsv<T: TableRow>(rows: &[T]) -> String {
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| escape_tsv(c)).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

fn render_table<T: TableRow>(rows: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::headers().iter().copied());
    for row in rows {
        builder.push_record(row.cells().iter().map(|c| truncate_str(c, MAX_CELL_WIDTH)));
    }
    builder.build().with(Style::rounded()).to_string()
}
