//! Coveo BEIR CLI
//!
//! Push a BEIR corpus into a Coveo source and collect search runs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coveo_beir::{
    adapter::CoveoSearch,
    config::Config,
    corpus::{load_corpus, load_queries},
    persistence::{DEFAULT_RESULTS_FILENAME, save_results},
    search::{QueryOutcome, disjunction},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Coveo BEIR - evaluate Coveo relevance on BEIR datasets
#[derive(Parser)]
#[command(name = "coveo-beir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push a corpus into the configured source
    Index {
        /// Path to corpus.jsonl
        #[arg(short, long)]
        corpus: PathBuf,
    },

    /// Index (unless skipped) and run every query
    Search {
        /// Path to corpus.jsonl
        #[arg(short, long)]
        corpus: PathBuf,

        /// Path to queries.jsonl
        #[arg(short, long)]
        queries: PathBuf,

        /// Result-count hint passed to the adapter
        #[arg(short = 'k', long, default_value_t = 1000)]
        top_k: usize,

        /// Where to save the run (.json or .bin)
        #[arg(short, long, default_value_os_t = default_output())]
        output: PathBuf,

        /// The source already holds this corpus
        #[arg(long)]
        skip_index: bool,
    },

    /// Run a single query and print the top hits
    Query {
        /// The query text
        text: String,

        /// Number of hits to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the effective configuration
    Config,
}

fn default_output() -> PathBuf {
    PathBuf::from("data").join(DEFAULT_RESULTS_FILENAME)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Index { corpus } => cmd_index(corpus, cli.no_progress).await,
        Commands::Search {
            corpus,
            queries,
            top_k,
            output,
            skip_index,
        } => cmd_search(corpus, queries, top_k, output, skip_index, cli.no_progress).await,
        Commands::Query { text, limit } => cmd_query(text, limit).await,
        Commands::Config => cmd_config(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_adapter(no_progress: bool) -> Result<CoveoSearch> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if no_progress {
        config.coveo.show_progress = false;
    }
    CoveoSearch::new(config.coveo).context("Invalid configuration")
}

async fn cmd_index(corpus_path: PathBuf, no_progress: bool) -> Result<()> {
    let mut adapter = load_adapter(no_progress)?;

    let corpus = load_corpus(&corpus_path).context("Failed to load corpus")?;
    println!("Corpus: {} ({} documents)", corpus_path.display(), corpus.len());
    println!(
        "Pushing to source '{}' in batches of {}",
        adapter.config().source_id,
        adapter.config().batch_size
    );

    let start = Instant::now();
    let report = adapter.index(&corpus).await.context("Indexing failed")?;

    println!("\nIndexing finished:");
    println!("  Documents:       {}", report.documents);
    println!("  Batches:         {}", report.batches);
    println!("  Failed batches:  {}", report.failed_batches);
    println!("  Time:            {:.2?}", start.elapsed());

    for diagnostic in &report.diagnostics {
        println!("  ! {}", diagnostic);
    }

    Ok(())
}

async fn cmd_search(
    corpus_path: PathBuf,
    queries_path: PathBuf,
    top_k: usize,
    output: PathBuf,
    skip_index: bool,
    no_progress: bool,
) -> Result<()> {
    let mut adapter = load_adapter(no_progress)?;
    if skip_index {
        adapter.mark_indexed();
    }

    let corpus = load_corpus(&corpus_path).context("Failed to load corpus")?;
    let queries = load_queries(&queries_path).context("Failed to load queries")?;
    println!(
        "Corpus: {} documents, queries: {}",
        corpus.len(),
        queries.len()
    );

    let start = Instant::now();
    let results = adapter
        .search(&corpus, &queries, top_k)
        .await
        .context("Search failed")?;

    let hits: usize = results.values().map(|scores| scores.len()).sum();
    println!("\nSearch finished:");
    println!("  Answered:  {}/{}", results.len(), queries.len());
    println!("  Hits:      {}", hits);
    println!("  Time:      {:.2?}", start.elapsed());

    let diagnostics = adapter.take_diagnostics();
    if !diagnostics.is_empty() {
        println!("\n{} failures:", diagnostics.len());
        for diagnostic in &diagnostics {
            println!("  ! {}", diagnostic);
        }
    }

    save_results(&results, &output).context("Failed to save results")?;
    println!("\nRun saved to: {}", output.display());

    Ok(())
}

async fn cmd_query(text: String, limit: usize) -> Result<()> {
    let adapter = load_adapter(true)?;

    println!("Query: {}", disjunction(&text));
    println!();

    match adapter.query(&text).await.context("Query failed")? {
        QueryOutcome::Hits(hits) => {
            if hits.is_empty() {
                println!("No results.");
                return Ok(());
            }

            println!("{}", "─".repeat(60));
            for (i, hit) in hits.iter().take(limit).enumerate() {
                println!(
                    "{:>2}. {} ({:.3}) {}",
                    i + 1,
                    hit.corpus_id(),
                    hit.score,
                    hit.title.as_deref().unwrap_or("")
                );
            }
            println!("{}", "─".repeat(60));
            println!("{} results", hits.len());
        }
        QueryOutcome::Rejected { status, body } => {
            println!("Search rejected ({}): {}", status, body);
        }
    }

    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let coveo = &config.coveo;

    println!("Configuration");
    println!("{}", "─".repeat(40));
    println!("  Organization:    {}", coveo.organization_id);
    println!("  Source:          {}", coveo.source_id);
    println!("  Push API key:    {}", mask(&coveo.api_key));
    println!("  Search API key:  {}", mask(&coveo.search_api_key));
    println!("  Push API:        {}", coveo.push_api_base());
    println!("  Search API:      {}", coveo.search_api_base());
    println!(
        "  Fields:          title='{}' body='{}'",
        coveo.fields.title, coveo.fields.body
    );
    println!("  Batch size:      {}", coveo.batch_size);
    println!("  Results/query:   {}", coveo.results_per_query);
    if let Some(path) = Config::config_file_path() {
        println!("  Config file:     {}", path.display());
    }

    if let Err(e) = config.validate() {
        println!("\nConfiguration error: {}", e);
    }

    Ok(())
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        return "(unset)".to_string();
    }
    let visible: String = key.chars().take(8).collect();
    format!("{}...", visible)
}
