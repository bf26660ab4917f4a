//! War Status Poller — Binary Entrypoint
//! One invocation performs one full poll cycle; scheduling (cron, systemd
//! timers) lives outside this process.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use war_status_poller::{run, Config, Fetcher, RunOutcome};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("war_status_poller=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::default();
    let fetcher = Fetcher::new(reqwest::Client::new());

    match run(&config, &fetcher).await? {
        RunOutcome::Updated => println!("✅ War status updated!"),
        RunOutcome::Unchanged => println!("No changes since last run."),
    }
    Ok(())
}
