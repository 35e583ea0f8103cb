//! The `crawl` subcommand: fetch every result page and write the tables.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use votecrawler_lib::{
    aggregate, AggregateReport, BatchCoordinator, BrokenSummary, Client, ClientConfig,
    PageOutcome, TableExtractor, TableSelector,
};

use crate::output::{self, OutputFormat};

/// Arguments for the `crawl` subcommand.
#[derive(Args)]
pub struct CrawlArgs {
    /// Text file with one result-page URL per line
    pub urlfile: PathBuf,

    /// Output CSV path (".csv" is appended when missing)
    #[arg(long, default_value = "voting_results")]
    pub outfile: String,

    /// Append rows to the output file instead of overwriting it
    #[arg(long)]
    pub append: bool,

    /// File listing URLs that produced no data (always overwritten)
    #[arg(long, default_value = "broken_urls.txt")]
    pub broken_url_file: PathBuf,

    /// Party catalog YAML (overrides the built-in catalog)
    #[arg(long)]
    pub parties: Option<PathBuf>,

    /// 0-based position of the results table among the page's tables
    #[arg(long, default_value = "1")]
    pub table_index: usize,

    /// Maximum number of requests in flight (default: unbounded)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Send a browser-like User-Agent header
    #[arg(long)]
    pub browser_ua: bool,
}

#[derive(Serialize)]
struct RunSummary {
    urls: usize,
    rows_written: usize,
    broken: BrokenSummary,
    fetch_seconds: f64,
    write_seconds: f64,
    outfile: String,
    broken_url_file: String,
}

pub async fn run(args: &CrawlArgs, format: &OutputFormat) -> Result<()> {
    let entries = super::read_url_file(&args.urlfile)?;
    let catalog = Arc::new(super::load_catalog(args.parties.as_deref())?);

    let client = Client::with_config(&ClientConfig {
        timeout: args.timeout_secs.map(Duration::from_secs),
        browser_user_agent: args.browser_ua,
    })?;
    let extractor = TableExtractor::new(Arc::clone(&catalog))
        .with_table_selector(TableSelector::nth(args.table_index));
    let mut coordinator = BatchCoordinator::new(client, extractor);
    if let Some(limit) = args.concurrency {
        coordinator = coordinator.with_concurrency_limit(limit);
    }

    tracing::info!(
        "Fetching {} pages for {} parties",
        entries.len(),
        catalog.len()
    );

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )?);

    let start = Instant::now();
    let mut failed = 0usize;
    let outcomes = coordinator
        .run_with_progress(&entries, |outcome| {
            if let Some(line) = failure_line(outcome) {
                failed += 1;
                pb.println(line);
            }
            pb.set_message(format!("{} failed", failed));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    let fetch_elapsed = start.elapsed();

    if *format == OutputFormat::Text {
        eprintln!(
            ":: Finished {} Sprengels in {:.2} seconds.",
            entries.len(),
            fetch_elapsed.as_secs_f64()
        );
    }

    let start = Instant::now();
    let report = aggregate(&entries, outcomes, &catalog);
    let outfile = output::results_path(&args.outfile);
    output::write_results_file(
        &outfile,
        &AggregateReport::header(&catalog),
        &report.rows,
        args.append,
    )?;

    let broken = report.broken_summary();
    if *format == OutputFormat::Text {
        eprintln!(
            ":: Failed to retrieve voting data for {} sprengels.",
            broken.total()
        );
        if broken.total() > 0 {
            eprintln!(
                "   {} fetch failures, {} pages without results table, {} task failures",
                broken.fetch_failed, broken.schema_mismatch, broken.task_failed
            );
        }
    }

    output::write_broken_file(&args.broken_url_file, report.broken_urls())?;
    let write_elapsed = start.elapsed();

    match format {
        OutputFormat::Text => eprintln!(
            ":: Writing data to files took {:.2} seconds.",
            write_elapsed.as_secs_f64()
        ),
        OutputFormat::Json => output::print_json(&RunSummary {
            urls: entries.len(),
            rows_written: report.rows.len(),
            broken,
            fetch_seconds: fetch_elapsed.as_secs_f64(),
            write_seconds: write_elapsed.as_secs_f64(),
            outfile: outfile.display().to_string(),
            broken_url_file: args.broken_url_file.display().to_string(),
        }),
    }

    Ok(())
}

/// Progress-bar line for an outcome that will end up in the broken-URL file.
fn failure_line(outcome: &PageOutcome) -> Option<String> {
    match &outcome.result {
        _ if outcome.is_usable() => None,
        Err(e) => Some(format!("  Warning: {} failed: {}", outcome.url, e)),
        Ok(_) => Some(format!("  Warning: {} has no results table", outcome.url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votecrawler_lib::{PageError, PartyTallies};

    const URL: &str = "http://x.example/a?detailonr=1";

    #[test]
    fn test_failure_line_for_failed_task() {
        let outcome = PageOutcome {
            url: URL.into(),
            result: Err(PageError::TaskFailed("panicked".into())),
        };
        assert_eq!(
            failure_line(&outcome).unwrap(),
            "  Warning: http://x.example/a?detailonr=1 failed: task failed: panicked"
        );
    }

    #[test]
    fn test_failure_line_for_empty_tallies() {
        let outcome = PageOutcome {
            url: URL.into(),
            result: Ok(PartyTallies::default()),
        };
        assert_eq!(
            failure_line(&outcome).unwrap(),
            "  Warning: http://x.example/a?detailonr=1 has no results table"
        );
    }
}
