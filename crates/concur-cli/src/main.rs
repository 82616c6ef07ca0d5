mod cli;
mod input;
mod report;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use concur_core::Engine;
use concur_exec::ProcRunner;
use concur_observe::{LogProgress, logger_init};

use crate::cli::Cli;

fn print_error_chain(err: &anyhow::Error) {
    eprintln!("Error: {err}");

    let mut n = 0;
    let mut cur = err.source();
    while let Some(cause) = cur {
        eprintln!("  {n}: {cause}");
        n += 1;
        cur = cause.source();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            print_error_chain(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    logger_init(&cli.logger_config()).context("failed to initialise logging")?;

    let cfg = cli.run_config();
    let targets = input::resolve_targets(cli.targets.clone()).context("failed to read targets from stdin")?;
    debug!(targets = targets.len(), "targets resolved");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping run");
                cancel.cancel();
            }
        }
    });

    let mut engine = Engine::new(Arc::new(ProcRunner::default())).with_cancel(cancel);
    if cli.pbar {
        engine = engine.with_progress(Arc::new(LogProgress::new()));
    }

    let result = engine.run(&cli.command, &targets, &cfg).await?;

    report::write_json(&mut std::io::stdout().lock(), &result).context("failed to write report")?;
    if cfg.flag_errors {
        report::write_flagged(&mut std::io::stderr().lock(), &result)?;
    }

    Ok(report::exit_status(&result))
}
