//! The `check` subcommand: validate inputs without touching the network.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::output::{print_entries_table, print_json, print_parties_table, OutputFormat};

/// Arguments for the `check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Text file with one result-page URL per line
    pub urlfile: PathBuf,

    /// Party catalog YAML (overrides the built-in catalog)
    #[arg(long)]
    pub parties: Option<PathBuf>,
}

#[derive(Serialize)]
struct CheckSummary {
    urls: usize,
    parties: Vec<String>,
}

pub fn run(args: &CheckArgs, format: &OutputFormat) -> Result<()> {
    let entries = super::read_url_file(&args.urlfile)?;
    let catalog = super::load_catalog(args.parties.as_deref())?;

    match format {
        OutputFormat::Text => {
            print_parties_table(catalog.parties());
            print_entries_table(&entries);
            eprintln!(
                ":: {} URLs and {} parties look valid.",
                entries.len(),
                catalog.len()
            );
        }
        OutputFormat::Json => print_json(&CheckSummary {
            urls: entries.len(),
            parties: catalog.ids().map(str::to_string).collect(),
        }),
    }
    Ok(())
}
