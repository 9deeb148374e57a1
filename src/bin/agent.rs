use distributed_calculator::agent::client::OrchestratorClient;
use distributed_calculator::agent::worker::WorkerPool;
use distributed_calculator::config::AgentConfig;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AgentConfig::from_env();
    tracing::info!(
        "Starting agent with {} workers (orchestrator: {})",
        config.computing_power,
        config.orchestrator_url
    );

    let client = Arc::new(OrchestratorClient::new(&config.orchestrator_url));
    let pool = WorkerPool::new(client, config.computing_power, config.poll_interval);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = pool.start(shutdown_rx);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested, stopping workers");
    shutdown_tx.send(true)?;

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Worker terminated abnormally: {}", e);
        }
    }

    Ok(())
}
