// inferd/crates/inferd/src/main.rs

use inferd::{config::Config, run_server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing first so config loading can report what it found; the second
    // init inside run_server is a no-op. Config::from_env loads .env itself.
    telemetry::init_tracing();

    let cfg = Config::from_env()?;
    run_server(cfg).await
}
