//! atlascorpus - Scientific Paper Corpus Builder
//!
//! ## Usage
//!
//! ### Build the corpus and training rows
//! ```bash
//! atlascorpus build --input seed.jsonl openalex.jsonl --merge-into-base
//! ```
//!
//! ### Fetch papers from OpenAlex
//! ```bash
//! atlascorpus fetch --query "sleep deprivation executive function" --pages 2
//! ```

use anyhow::{Context, Result};
use atlascorpus::config::{expand_home, BuildConfig, FetchConfig};
use atlascorpus::{openalex, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scientific Paper Corpus Builder
#[derive(Parser)]
#[command(name = "atlascorpus")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Project root used to derive default paths
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the research corpus and derived training rows
    Build {
        /// JSONL files with paper records (later files win on duplicates)
        #[arg(long, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Cap on papers kept after deduplication
        #[arg(long, default_value_t = 5000)]
        max_papers: usize,

        /// Merge generated rows into the base training dataset
        #[arg(long)]
        merge_into_base: bool,

        /// Output path for generated science training rows
        #[arg(long)]
        science_output: Option<PathBuf>,

        /// Base training dataset path
        #[arg(long)]
        base: Option<PathBuf>,

        /// Markdown report path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Swift research pack output paths
        #[arg(long, num_args = 1..)]
        pack: Vec<PathBuf>,
    },

    /// Fetch papers from OpenAlex into a JSONL corpus file
    Fetch {
        /// Search query (repeat for multiple domains)
        #[arg(long)]
        query: Vec<String>,

        /// Newline-delimited query file
        #[arg(long)]
        query_file: Option<PathBuf>,

        /// Pages per query
        #[arg(long, default_value_t = 5)]
        pages: u32,

        /// Items per page
        #[arg(long, default_value_t = 100)]
        per_page: u32,

        /// Lower bound publication year
        #[arg(long, default_value_t = 1990)]
        from_year: i64,

        /// Hard cap on total papers
        #[arg(long, default_value_t = 25_000)]
        max_papers: usize,

        /// Contact email for the polite pool
        #[arg(long)]
        mailto: Option<String>,

        /// Output JSONL path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Delay between requests in milliseconds
        #[arg(long, default_value_t = 200)]
        sleep_ms: u64,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the key=value summary
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let root = expand_home(&cli.root);

    match cli.command {
        Commands::Build {
            input,
            max_papers,
            merge_into_base,
            science_output,
            base,
            report,
            pack,
        } => {
            let mut config = BuildConfig::with_root(&root);
            if !input.is_empty() {
                config.inputs = input.iter().map(|p| expand_home(p)).collect();
            }
            if let Some(path) = science_output {
                config.science_training = expand_home(&path);
            }
            if let Some(path) = base {
                config.base_training = expand_home(&path);
            }
            if let Some(path) = report {
                config.report = expand_home(&path);
            }
            if !pack.is_empty() {
                config.research_packs = pack.iter().map(|p| expand_home(p)).collect();
            }
            config.max_papers = max_papers;
            config.merge_into_base = merge_into_base;

            run_build(&config)
        }
        Commands::Fetch {
            query,
            query_file,
            pages,
            per_page,
            from_year,
            max_papers,
            mailto,
            output,
            sleep_ms,
        } => {
            let mut config = FetchConfig::with_root(&root);
            config.queries = query;
            if let Some(path) = query_file {
                config.query_file = Some(expand_home(&path));
            }
            if let Some(path) = output {
                config.output = expand_home(&path);
            }
            config.pages = pages;
            config.per_page = per_page;
            config.from_year = from_year;
            config.max_papers = max_papers;
            config.mailto = mailto;
            config.sleep_ms = sleep_ms;

            run_fetch(&config).await
        }
    }
}

fn run_build(config: &BuildConfig) -> Result<()> {
    let summary = pipeline::run_build(config).context("Corpus build failed")?;
    for line in summary.summary_lines() {
        println!("{line}");
    }
    Ok(())
}

async fn run_fetch(config: &FetchConfig) -> Result<()> {
    let summary = openalex::fetch_corpus(config)
        .await
        .context("OpenAlex fetch failed")?;

    println!("queries={}", summary.queries);
    println!("papers={}", summary.papers);
    println!("failed_pages={}", summary.failed_pages);
    if let Some(path) = &config.query_file {
        println!("query_file={}", path.display());
    }
    println!("output={}", config.output.display());
    Ok(())
}
