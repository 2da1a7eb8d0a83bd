//! Taskboard - headless task board runner
//!
//! Mirrors the configured remote task list, keeps it reconciled on the
//! configured interval and logs every board render.
//!
//! `taskboard --once` runs a single sync and prints the board as JSON.

use anyhow::Context;
use taskboard_app::utils::logging::{init_tracing, log_board};
use taskboard_app::AppContext;
use taskboard_infra::config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading RUST_LOG / TASKBOARD_* variables
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let config = config::load().context("failed to load configuration")?;
    let ctx = AppContext::new_with_config(config).context("failed to initialize taskboard")?;

    if std::env::args().skip(1).any(|arg| arg == "--once") {
        return run_once(&ctx).await;
    }

    let mut renders = ctx.board.subscribe();
    let render_task = tokio::spawn(async move {
        while renders.changed().await.is_ok() {
            let board = renders.borrow_and_update().clone();
            log_board(&board);
        }
    });

    ctx.start().await.context("failed to start trigger scheduler")?;

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("ctrl-c received, shutting down");

    ctx.shutdown().await.context("failed to stop trigger scheduler")?;
    render_task.abort();
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn run_once(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.refresh_auth().await.context("auth status check failed")? {
        warn!("session is not signed in, nothing to sync");
        return Ok(());
    }

    let report = ctx.board.sync().await.context("sync failed")?;
    info!(?report, "sync finished");

    let board = ctx.board.board();
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}
