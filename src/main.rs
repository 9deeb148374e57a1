use distributed_calculator::config::OrchestratorConfig;
use distributed_calculator::orchestrator::handlers::router;
use distributed_calculator::orchestrator::service::Orchestrator;
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut config = OrchestratorConfig::from_env()?;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                let Some(addr) = args.get(i + 1) else {
                    eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                    std::process::exit(1);
                };
                config.bind_addr = addr.parse::<SocketAddr>()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    tracing::info!(
        "Operation time hints: + {:?}, - {:?}, * {:?}, / {:?}",
        config.durations.addition,
        config.durations.subtraction,
        config.durations.multiplication,
        config.durations.division
    );

    let orchestrator = Orchestrator::new(config.durations);

    // Stats reporter:
    let stats_orchestrator = orchestrator.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));

        loop {
            interval.tick().await;
            let stats = stats_orchestrator.stats().await;
            tracing::info!(
                "Expressions: {} pending, {} in progress, {} completed, {} failed",
                stats.expressions_pending,
                stats.expressions_in_progress,
                stats.expressions_completed,
                stats.expressions_failed
            );
            tracing::info!(
                "Tasks: {} total, {} queued, {} waiting, {} completed, {} failed",
                stats.tasks_total,
                stats.tasks_queued,
                stats.tasks_waiting,
                stats.tasks_completed,
                stats.tasks_failed
            );
        }
    });

    let app = router(orchestrator);

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
