mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "votecrawler")]
#[command(about = "Fetch municipal election results and tabulate party tallies")]
struct Cli {
    /// Summary format: text or json
    #[arg(long, default_value = "text", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all result pages and write the results and broken-URL files
    Crawl(commands::crawl::CrawlArgs),
    /// Validate the URL list and party catalog without fetching
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("votecrawler=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    match &cli.command {
        Commands::Crawl(args) => commands::crawl::run(args, &format).await?,
        Commands::Check(args) => commands::check::run(args, &format)?,
    }

    Ok(())
}
