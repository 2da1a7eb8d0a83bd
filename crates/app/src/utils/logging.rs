//! Tracing setup and board render logging

use taskboard_domain::{Board, ColumnId};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,taskboard=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. Setting `TASKBOARD_LOG_JSON`
/// to a truthy value switches to one JSON object per line.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    // A second init (tests, embedding) keeps the first subscriber.
    if json_requested() {
        let _ = registry.with(fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(fmt::layer().with_target(true)).try_init();
    }
}

fn json_requested() -> bool {
    std::env::var("TASKBOARD_LOG_JSON")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Log one line per render of the board.
pub fn log_board(board: &Board) {
    info!(
        todo = board.column(ColumnId::Todo).len(),
        in_progress = board.column(ColumnId::InProgress).len(),
        done = board.column(ColumnId::Done).len(),
        "board_rendered"
    );
}
