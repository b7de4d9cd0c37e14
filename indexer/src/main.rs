use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsim_core::persist::{load_snapshot, save_snapshot, IndexPaths, MetaFile};
use docsim_core::tables::{load_phi, load_side_file, load_theta};
use docsim_core::{Config, QueryContext};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docsim-indexer")]
#[command(about = "Build and query topic + TF-IDF document similarity snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a snapshot from the theta/phi tables and optional side files
    Build {
        /// Tab-separated theta table (doc topic distributions and segmented text)
        #[arg(long)]
        theta: PathBuf,
        /// Comma-separated phi table (term topic probabilities)
        #[arg(long)]
        phi: PathBuf,
        /// TOML config; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON object of doc id -> section label
        #[arg(long)]
        sections: Option<PathBuf>,
        /// JSON object of doc id -> original unsegmented text
        #[arg(long)]
        original_text: Option<PathBuf>,
        /// Output snapshot directory
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the closest documents to a doc id as JSON
    Query {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        #[arg(long)]
        doc_id: String,
        /// Topic candidate pool size; defaults to the snapshot's config
        #[arg(long)]
        n: Option<usize>,
    },
    /// Print snapshot metadata
    Stats {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { theta, phi, config, sections, original_text, output } => {
            build_snapshot(&theta, &phi, config.as_deref(), sections.as_deref(), original_text.as_deref(), &output)
        }
        Commands::Query { index, doc_id, n } => query(&index, &doc_id, n),
        Commands::Stats { index } => stats(&index),
    }
}

fn load_optional_side_file(path: Option<&Path>) -> Result<HashMap<String, String>> {
    match path {
        Some(p) => load_side_file(p).with_context(|| format!("loading side file {}", p.display())),
        None => Ok(HashMap::new()),
    }
}

fn build_snapshot(
    theta: &Path,
    phi: &Path,
    config: Option<&Path>,
    sections: Option<&Path>,
    original_text: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let config = Config::load(config).context("loading config")?;
    let rows = load_theta(theta).with_context(|| format!("loading theta table {}", theta.display()))?;
    let phi = load_phi(phi).with_context(|| format!("loading phi table {}", phi.display()))?;
    let sections = load_optional_side_file(sections)?;
    let original_text = load_optional_side_file(original_text)?;
    tracing::info!(num_docs = rows.len(), phi_terms = phi.phis.len(), "ingested tables");

    let ctx = QueryContext::build(rows, phi, &sections, &original_text, config)?;

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = MetaFile::describe(&ctx, created_at);
    let out_paths = IndexPaths::new(output);
    save_snapshot(&out_paths, &ctx, &meta)?;

    tracing::info!(output = %output.display(), reduced_vocab = meta.reduced_vocab, "snapshot build complete");
    Ok(())
}

fn query(index: &Path, doc_id: &str, n: Option<usize>) -> Result<()> {
    let (ctx, _meta) = load_snapshot(&IndexPaths::new(index))?;
    let result = match n {
        Some(n) => ctx.closest_docs_with(doc_id, n)?,
        None => ctx.closest_docs(doc_id)?,
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[derive(Serialize)]
struct Stats<'a> {
    meta: &'a MetaFile,
    too_rare_cutoff: f64,
    too_common_cutoff: f64,
    preferred_works: usize,
    topic_labels: &'a [String],
}

fn stats(index: &Path) -> Result<()> {
    let (ctx, meta) = load_snapshot(&IndexPaths::new(index))?;
    let stats = Stats {
        meta: &meta,
        too_rare_cutoff: ctx.config.vocabulary.too_rare_cutoff,
        too_common_cutoff: ctx.config.vocabulary.too_common_cutoff,
        preferred_works: ctx.works.preferred().len(),
        topic_labels: ctx.topic_labels(),
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
