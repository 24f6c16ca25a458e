mod cli;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::App;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = cdcfile::init_logging(cdcfile::logging::DEFAULT_DIRECTIVE) {
        eprintln!("failed to initialise logging: {e}");
    }

    match App::parse().run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "cdcfile failed");
            ExitCode::FAILURE
        }
    }
}
