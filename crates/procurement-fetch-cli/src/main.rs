//! procurement-fetch — command-line entry point.

mod input;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use procurement_fetch::config::resolve_sam_api_key;
use procurement_fetch::{
    concatenate, fetch_awards, fetch_capability_pdfs, fetch_entities, FetchConfig, HttpClient,
};

use crate::input::IdentifierSource;

#[derive(Parser)]
#[command(
    name = "procurement-fetch",
    about = "Fetch federal procurement data — SAM.gov firms, USAspending awards, SBA capability statements",
    version
)]
struct Cli {
    /// Root directory for raw artifacts.
    /// Also reads from PROCUREMENT_RAW_DATA_DIR env var.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Per-request timeout in seconds (default: wait indefinitely).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct IdentifierArgs {
    /// UEI to fetch. Can be repeated.
    #[arg(long = "uei")]
    ueis: Vec<String>,

    /// Text file with one UEI per line.
    #[arg(long)]
    list_file: Option<PathBuf>,

    /// SAM snapshot to read UEIs from (default: the one saved by `entities`).
    #[arg(long)]
    sam_file: Option<PathBuf>,
}

impl From<IdentifierArgs> for IdentifierSource {
    fn from(args: IdentifierArgs) -> Self {
        IdentifierSource {
            ueis: args.ueis,
            list_file: args.list_file,
            sam_file: args.sam_file,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Query SAM.gov for active 8(a) firms and save the raw snapshot.
    Entities {
        /// SAM.gov API key.
        /// Also reads from SAM_API_KEY env var.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Fetch award children for each UEI in one year.
    Awards {
        /// Award year.
        #[arg(long)]
        year: i32,

        /// Also save non-200 responses.
        #[arg(long)]
        save_unsuccessful: bool,

        #[command(flatten)]
        ids: IdentifierArgs,
    },

    /// Download capability-statement PDFs not already on disk.
    Pdfs {
        /// Output directory (default: <data-dir>/raw_pdfs).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        ids: IdentifierArgs,
    },

    /// Concatenate saved award artifacts into JSON lines.
    Concat {
        /// Directory with award artifacts (default: <data-dir>/raw_award_data).
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   procurement-fetch completions bash > ~/.local/share/bash-completion/completions/procurement-fetch
    ///   procurement-fetch completions zsh > ~/.zfunc/_procurement-fetch
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = FetchConfig::from_env(cli.data_dir.as_deref())
        .with_timeout(cli.timeout_secs.map(Duration::from_secs));

    match cli.command {
        Commands::Entities { api_key } => {
            let client = HttpClient::new(&config)?;
            let key = resolve_sam_api_key(api_key.as_deref());
            let snapshot = fetch_entities(&client, &config, key.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Awards {
            year,
            save_unsuccessful,
            ids,
        } => {
            let ueis = IdentifierSource::from(ids).resolve(&config)?;
            let client = HttpClient::new(&config)?;
            let report = fetch_awards(&client, &config, &ueis, year, save_unsuccessful).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Pdfs { output_dir, ids } => {
            let ueis = IdentifierSource::from(ids).resolve(&config)?;
            let output_dir = output_dir.unwrap_or_else(|| config.pdf_dir());
            let client = HttpClient::new(&config)?;
            let report = fetch_capability_pdfs(&client, &config, &ueis, &output_dir).await?;
            let summary = serde_json::json!({
                "output_dir": output_dir,
                "skipped_existing": report.skipped_existing.len(),
                "saved": report.saved(),
                "no_document": report.no_document(),
                "failed": report.failed(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Concat { input_dir, output } => {
            let input_dir = input_dir.unwrap_or_else(|| config.award_dir());
            let table = concatenate(&input_dir)?;
            match output {
                Some(path) => {
                    let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
                    table.write_json_lines(&mut file)?;
                    tracing::info!("{} rows written to {}", table.len(), path.display());
                }
                None => table.write_json_lines(&mut std::io::stdout().lock())?,
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "procurement-fetch", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_awards_command() {
        let cli = Cli::try_parse_from([
            "procurement-fetch",
            "--data-dir",
            "/tmp/raw",
            "awards",
            "--year",
            "2023",
            "--uei",
            "A1",
            "--uei",
            "A2",
            "--save-unsuccessful",
        ])
        .unwrap();

        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/raw"));
        match cli.command {
            Commands::Awards {
                year,
                save_unsuccessful,
                ids,
            } => {
                assert_eq!(year, 2023);
                assert!(save_unsuccessful);
                assert_eq!(ids.ueis, vec!["A1", "A2"]);
            }
            _ => panic!("expected awards command"),
        }
    }

    #[test]
    fn test_awards_requires_year() {
        assert!(Cli::try_parse_from(["procurement-fetch", "awards", "--uei", "A1"]).is_err());
    }
}
