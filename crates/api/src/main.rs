//! `calsync` entry point.
//!
//! One invocation performs one run and exits. Console output goes to stdout;
//! logs and the failure diagnostic go to stderr.

#![allow(clippy::print_stderr)]

use std::io::Write as _;
use std::process::ExitCode;

use calsync_core::SyncOutcome;
use calsync_domain::{Result, SyncError};
use calsync_lib::logging::{self, LogFormat, LOG_FORMAT_ENV};
use calsync_lib::{output, AppContext, Cli};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Exit status after an interrupt (128 + SIGINT).
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    if let Err(e) = logging::init(format) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match run(&cli, &cancel).await {
        Ok(outcome) => match print(&outcome) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("calsync: failed to write output: {e:#}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            error!(stage = err.stage(), error = %err.message(), "calendar sync failed");
            eprintln!("calsync: {} stage failed: {}", err.stage(), err.message());
            match err {
                SyncError::Cancelled => ExitCode::from(EXIT_CANCELLED),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<SyncOutcome> {
    let mut config = calsync_infra::config::load(cli.config.clone())?;
    cli.apply(&mut config);

    let context = AppContext::new(&config)?;
    context.run(cancel).await
}

fn print(outcome: &SyncOutcome) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::render(&mut out, outcome)?;
    out.flush()?;
    Ok(())
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            cancel.cancel();
        }
    });
}
