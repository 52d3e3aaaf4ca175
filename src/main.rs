//! # edgarq CLI
//!
//! One invocation answers one query:
//!
//! ```bash
//! edgarq "What were NVIDIA's data center revenues?"
//! edgarq --config ./edgarq.toml "How did operating margin change?"
//! ```
//!
//! The pipeline: download any missing 10-K filings, scan the corpus
//! directory, build (or load the cached) embedding index, run the
//! retrieval agent, and print the structured result as pretty JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use edgarq::{agent, config, corpus, edgar, embedding, index};

/// edgarq — ask natural-language questions of SEC 10-K filings.
///
/// Corpus, chunking, retrieval, and embedding settings are read from a
/// TOML configuration file; built-in defaults apply when it is absent.
#[derive(Parser)]
#[command(
    name = "edgarq",
    about = "Ask natural-language questions of SEC 10-K filings via local semantic retrieval",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply if the file
    /// does not exist.
    #[arg(long, default_value = "./edgarq.toml")]
    config: PathBuf,

    /// The question to answer.
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    // Best-effort download of missing filings; failures are logged and
    // skipped so an offline run can still use what is on disk.
    if let Err(e) = edgar::ensure_filings(&cfg).await {
        eprintln!("Warning: filing download incomplete: {}", e);
    }

    let files = corpus::scan_corpus(&cfg.corpus.data_dir)?;
    if files.is_empty() {
        eprintln!(
            "No filings found in {} even after download.",
            cfg.corpus.data_dir.display()
        );
        std::process::exit(1);
    }

    let provider = embedding::create_provider(&cfg.embedding)?;
    let cache = index::FileCache::new(cfg.cache.path.clone());
    let built = index::build_index(&files, &cfg, &cache, provider.as_ref()).await?;

    let result = agent::answer(&cli.query, provider.as_ref(), &cfg, &built).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
