use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use votecrawler_lib::{OutputRow, Party, UrlEntry};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Tabled, Serialize)]
struct EntryRow {
    #[tabled(rename = "Gemeinde-Sprengel")]
    #[serde(rename = "Gemeinde-Sprengel")]
    key: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    url: String,
}

#[derive(Tabled, Serialize)]
struct PartyRow {
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    id: String,
    #[tabled(rename = "Alternates")]
    #[serde(rename = "Alternates")]
    alternates: String,
}

// -- Row builders --

fn build_entry_rows(entries: &[UrlEntry]) -> Vec<EntryRow> {
    entries
        .iter()
        .map(|e| EntryRow {
            key: e.key(),
            url: e.url.clone(),
        })
        .collect()
}

fn build_party_rows(parties: &[Party]) -> Vec<PartyRow> {
    parties
        .iter()
        .map(|p| PartyRow {
            id: p.id.clone(),
            alternates: p.alternates.join(", "),
        })
        .collect()
}

// -- Table output --

pub fn print_entries_table(entries: &[UrlEntry]) {
    let mut table = Table::new(build_entry_rows(entries));
    table.with(Style::sharp());
    println!("{}", table);
}

pub fn print_parties_table(parties: &[Party]) {
    let mut table = Table::new(build_party_rows(parties));
    table.with(Style::sharp());
    println!("{}", table);
}

// -- CSV output --

/// Appends `.csv` unless the path already ends with it.
pub fn results_path(outfile: &str) -> PathBuf {
    if outfile.ends_with(".csv") {
        PathBuf::from(outfile)
    } else {
        PathBuf::from(format!("{}.csv", outfile))
    }
}

pub fn write_results<W: Write>(
    writer: W,
    header: &[String],
    rows: &[OutputRow],
    include_header: bool,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    if include_header {
        wtr.write_record(header)?;
    }
    for row in rows {
        wtr.write_record(
            std::iter::once(row.key.as_str()).chain(row.values.iter().map(String::as_str)),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the results table to `path`.
///
/// In append mode the header is only written when the file is new or empty.
pub fn write_results_file(
    path: &Path,
    header: &[String],
    rows: &[OutputRow],
    append: bool,
) -> Result<()> {
    let include_header = !append || fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    write_results(BufWriter::new(file), header, rows, include_header)
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_broken_urls<'a, W: Write>(
    mut writer: W,
    urls: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for url in urls {
        writeln!(writer, "{}", url)?;
    }
    writer.flush()?;
    Ok(())
}

/// Overwrites `path` with one broken URL per line.
pub fn write_broken_file<'a>(path: &Path, urls: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_broken_urls(BufWriter::new(file), urls)
        .with_context(|| format!("failed to write {}", path.display()))
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
