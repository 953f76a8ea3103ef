//! Command-line shell for the transfer backend.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use easytoolkit_client::AccessKeepalive;
use easytoolkit_transfer::{FnSink, ProgressUpdate, TransferIdentity, ensure};
use easytoolkit_uploader::{
    DownloadSession, ErrorKind, RemoteEndpoint, TransferConfig, TransferSession,
    clear_best_effort,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "easytoolkit-transfer")]
#[command(about = "Chunked uploads and downloads against the transfer backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend URL, overriding the config file
    #[arg(short, long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file in chunks
    Upload {
        file: PathBuf,

        /// Transfer id to reuse (generated if omitted)
        #[arg(long)]
        id: Option<String>,

        /// Chunk size in bytes, overriding the config file
        #[arg(long)]
        chunk_size: Option<u64>,
    },

    /// Download the payload cached under an id
    Download {
        id: String,

        /// Output file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Drop the backend state held for an id
    Clear { id: String },

    /// Keep an id's cached payload alive until interrupted
    Keepalive { id: String },

    /// Print a fresh transfer id
    NewId,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut cfg = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            TransferConfig::default()
        }
    };
    if let Some(server) = cli.server {
        cfg.base_url = server;
    }

    match cli.command {
        Commands::Upload {
            file,
            id,
            chunk_size,
        } => {
            if let Some(size) = chunk_size {
                cfg.chunk_size = size;
            }
            upload_command(&cfg, file, id).await
        }
        Commands::Download { id, output } => download_command(&cfg, id, output).await,
        Commands::Clear { id } => clear_command(&cfg, id).await,
        Commands::Keepalive { id } => keepalive_command(&cfg, id).await,
        Commands::NewId => {
            println!("{}", TransferIdentity::generate()?);
            Ok(())
        }
    }
}

fn endpoint(cfg: &TransferConfig) -> Result<Arc<dyn RemoteEndpoint>> {
    Ok(Arc::new(cfg.client()?))
}

/// Cancels `token` on the first Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            token.cancel();
        }
    })
}

async fn upload_command(cfg: &TransferConfig, file: PathBuf, id: Option<String>) -> Result<()> {
    let endpoint = endpoint(cfg)?;
    let identity = TransferIdentity::from_existing(ensure(id.as_deref())?)?;
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(cancel.clone());

    let sink = Arc::new(FnSink(|u: &ProgressUpdate| {
        info!(percent = u.percent, "{}", u.status);
    }));
    let mut session = TransferSession::open(endpoint, identity, &file, cfg.chunk_size)
        .await?
        .with_sink(sink)
        .with_cancel(cancel);

    info!(
        id = %session.identity(),
        file = %file.display(),
        bytes = session.file_size(),
        chunks = session.plan().total_chunks(),
        "starting upload"
    );
    let result = session.run().await;
    interrupt.abort();

    if let Err(e) = result {
        if e.kind() == ErrorKind::Cancelled {
            bail!("upload cancelled");
        }
        match session.last_error() {
            Some(d) => bail!("upload failed ({}): {}", d.kind, d.message),
            None => return Err(e.into()),
        }
    }

    println!("{}", session.identity());
    Ok(())
}

async fn download_command(cfg: &TransferConfig, id: String, output: PathBuf) -> Result<()> {
    let payload = DownloadSession::new(endpoint(cfg)?, id).run().await?;
    let written = payload.write_to(&output).await?;
    println!("{}", written.display());
    Ok(())
}

async fn clear_command(cfg: &TransferConfig, id: String) -> Result<()> {
    let endpoint = endpoint(cfg)?;
    clear_best_effort(endpoint.as_ref(), &id).await;
    Ok(())
}

async fn keepalive_command(cfg: &TransferConfig, id: String) -> Result<()> {
    let client = Arc::new(cfg.client()?);
    let Some(keepalive) = AccessKeepalive::start(client, &id, cfg.access_fallback()).await else {
        info!(id = %id, "backend disabled access keepalive, nothing to do");
        return Ok(());
    };

    info!(id = %id, interval = ?keepalive.interval(), "keeping transfer alive, Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    keepalive.stop().await;
    Ok(())
}
