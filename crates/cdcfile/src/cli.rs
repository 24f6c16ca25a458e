use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cdcfile::gateway::{GatewayState, router};
use cdcfile::{FileCategory, FileRecord, GatewayConfig, Urn};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Exit code when nothing was found for the urn or its fallbacks.
pub const NOT_FOUND_EXIT: u8 = 2;

#[derive(Clone, Debug, Parser)]
#[command(name = "cdcfile", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// TOML configuration file; `CDCFILE_*` variables override it.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "s", name = "serve", about = "Run the HTTP gateway")]
    Serve,
    #[command(alias = "g", name = "get", about = "Fetch one urn's files to disk")]
    Get(GetArg),
}

#[derive(Clone, Debug, Args)]
pub struct GetArg {
    pub urn: Urn,

    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub category: FileCategory,

    /// Urns searched, in order, when `urn` has no files.
    #[arg(short, long, value_delimiter = ',', value_name = "URN,...")]
    pub fallback: Option<Vec<Urn>>,

    /// Output path, or `-` for stdout. Defaults to the file's own name.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl App {
    pub async fn run(self) -> Result<ExitCode> {
        let config = GatewayConfig::load(self.config.as_deref()).context("failed to load configuration")?;
        match self.cmd {
            Commands::Serve => serve(config).await.map(|()| ExitCode::SUCCESS),
            Commands::Get(arg) => arg.run(config).await,
        }
    }
}

async fn serve(config: GatewayConfig) -> Result<()> {
    let fallback_header = config.fallback_header_name()?;
    let manager = config.build_manager()?;

    let shutdown = CancellationToken::new();
    let state = GatewayState::new(manager, fallback_header).with_shutdown(shutdown.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    tracing::info!(address = %config.listen, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
            shutdown.cancel();
        })
        .await
        .context("server error")?;

    Ok(())
}

impl GetArg {
    async fn run(self, config: GatewayConfig) -> Result<ExitCode> {
        let manager = config.build_manager()?;
        let cancel = CancellationToken::new();

        let file = {
            let lookup = manager.get_file(self.urn, self.category, self.fallback.as_deref(), &cancel);
            tokio::select! {
                result = lookup => result?,
                _ = tokio::signal::ctrl_c() => {
                    cancel.cancel();
                    anyhow::bail!("interrupted");
                }
            }
        };

        let Some(file) = file else {
            tracing::warn!(urn = %self.urn, category = %self.category, "no files found");
            return Ok(ExitCode::from(NOT_FOUND_EXIT));
        };

        let out = output_path(self.out, &file);
        write_output(&file, &out).await?;
        Ok(ExitCode::SUCCESS)
    }
}

/// `out` if given, else the file's own name in the current directory.
fn output_path(out: Option<PathBuf>, file: &FileRecord) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from(file.file_name().unwrap_or("file")))
}

/// Write `file`'s bytes to `out`, or to stdout when `out` is `-`.
async fn write_output(file: &FileRecord, out: &Path) -> Result<()> {
    if out == Path::new("-") {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(file.content_bytes()).await?;
        stdout.flush().await?;
    } else {
        tokio::fs::write(out, file.content_bytes())
            .await
            .with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), %file, "file written");
    }
    Ok(())
}
