use anyhow::{Context, Result};
use clap::Parser;
use docsim_core::persist::{load_snapshot, IndexPaths};
use server::app_with_context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(about = "Serve document-similarity rankings over HTTP")]
struct Args {
    /// Snapshot directory written by docsim-indexer
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let paths = IndexPaths::new(&args.index);
    let (ctx, meta) = tokio::task::spawn_blocking(move || load_snapshot(&paths))
        .await?
        .with_context(|| format!("loading snapshot from {}", args.index.display()))?;
    tracing::info!(
        index = %args.index.display(),
        built = %meta.created_at,
        num_docs = meta.num_docs,
        num_topics = meta.num_topics,
        reduced_vocab = meta.reduced_vocab,
        preferred_works = ctx.works.preferred().len(),
        candidate_pool = ctx.config.search.candidate_pool,
        "snapshot loaded"
    );

    let app = app_with_context(Arc::new(ctx));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "docsim server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
