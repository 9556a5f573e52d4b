//! gossipwire node: replays hex frames from stdin as one peer and writes the
//! node's replies to stdout.
//!
//! Usage: `gossipwire-node [config.yaml]` (default `gossipwire.yaml`).
//! Log level via `RUST_LOG`; logs and final metrics go to stderr.

use tokio::io::BufReader;
use tracing_subscriber::{fmt, EnvFilter};

use gossipwire_core::error::Result;
use gossipwire_node::{app_state::AppState, config, transport::replay};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "gossipwire-node failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gossipwire.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let state = AppState::new(cfg)?;

    tracing::info!(
        config = %path,
        chain = %state.chain(),
        network = state.chain().network().unwrap_or("custom"),
        "gossipwire-node starting"
    );

    let input = BufReader::new(tokio::io::stdin());
    let (stats, _) = replay::run(&state, "stdin", input, tokio::io::stdout()).await?;

    eprint!("{}", state.metrics().render());
    if stats.failed {
        tracing::warn!("peer connection failed during replay");
    }
    Ok(())
}
