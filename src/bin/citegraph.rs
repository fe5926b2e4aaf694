//! Citegraph CLI — citation graph builder for markdown note vaults.
//!
//! Usage:
//!   citegraph generate --vault <path> [--fetch-year] [--mailto <email>]
//!   citegraph scan --vault <path>

use citegraph::{
    ConsoleStatus, CrossrefClient, FsVault, LinkGenerator, LinkerConfig, VaultStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "citegraph",
    version,
    about = "Citation graph builder for markdown note vaults"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve references and rewrite meta blocks with in-vault links
    Generate {
        /// Path to the vault root directory
        #[arg(long)]
        vault: PathBuf,
        /// Fetch and persist publication years from CrossRef
        #[arg(long)]
        fetch_year: bool,
        /// Contact email for the CrossRef polite pool
        #[arg(long)]
        mailto: Option<String>,
    },
    /// List qualifying notes without modifying anything
    Scan {
        /// Path to the vault root directory
        #[arg(long)]
        vault: PathBuf,
    },
}

async fn cmd_generate(vault: PathBuf, fetch_year: bool, mailto: Option<String>) -> i32 {
    let mut client = CrossrefClient::new();
    if let Some(mailto) = mailto {
        client = client.with_mailto(mailto);
    }

    let generator = LinkGenerator::new(
        Arc::new(FsVault::new(vault)),
        Arc::new(client),
        Arc::new(ConsoleStatus),
        LinkerConfig { fetch_year },
    );

    match generator.generate().await {
        Ok(summary) => {
            if summary.duplicate_dois > 0 || summary.skipped_writes > 0 {
                eprintln!(
                    "{} duplicate doi(s), {} note(s) skipped at write time",
                    summary.duplicate_dois, summary.skipped_writes
                );
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_scan(vault: PathBuf) -> i32 {
    let vault = FsVault::new(vault);
    let notes = match vault.list_notes() {
        Ok(notes) => notes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut qualifying = 0;
    println!("{:<40}  {:<28}  {:>5}", "NOTE", "DOI", "REFS");
    println!("{}", "-".repeat(77));
    for note in &notes {
        let text = match vault.read(note).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: cannot read '{}': {}", note.name, e);
                continue;
            }
        };
        let fields = citegraph::meta::parse_block(&text);
        let Some(raw_doi) = fields.get(citegraph::meta::DOI_KEY) else {
            continue;
        };
        let doi = citegraph::meta::unwrap_link(raw_doi);
        if doi.is_empty() {
            continue;
        }
        let refs = fields
            .get(citegraph::meta::REFS_KEY)
            .map(|v| citegraph::meta::parse_ref_list(v).len())
            .unwrap_or(0);
        println!("{:<40}  {:<28}  {:>5}", note.name, doi, refs);
        qualifying += 1;
    }
    println!("{} qualifying note(s) of {} total.", qualifying, notes.len());
    0
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Generate {
            vault,
            fetch_year,
            mailto,
        } => cmd_generate(vault, fetch_year, mailto).await,
        Commands::Scan { vault } => cmd_scan(vault).await,
    };
    std::process::exit(code);
}
