use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tourney_intake::config::Config;
use tourney_intake::domain::intake::{CommandRegistry, IntakeValidator, PgEventCommandHandler};
use tourney_intake::http::{start_http_server, AppState};
use tourney_intake::messaging::KafkaCommandSource;
use tourney_intake::metrics::Metrics;
use tourney_intake::proximity::{PgRegionStore, ProximityEventQuery};
use tourney_intake::worker::{CommandDispatcher, IntakeDispatchWorker, WorkerOptions};
use tourney_intake::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=tourney_intake=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tourney_intake=debug"))
        )
        .init();

    tracing::info!("🚀 Starting tourney intake service");

    // === 1. Configuration ===
    let config = Config::from_env()?;
    tracing::info!(
        queue = %config.received_queue,
        group = %config.consumer_group,
        max_concurrent_calls = config.max_concurrent_calls,
        "Configuration loaded"
    );

    // === 2. Postgres pool ===
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;

    // === 3. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 4. HTTP server (metrics, health, nearby events) ===
    let query = Arc::new(ProximityEventQuery::new(Arc::new(PgRegionStore::new(pool.clone()))));
    let server = start_http_server(
        Arc::new(AppState {
            metrics: metrics.clone(),
            query,
        }),
        config.http_port,
    )?;
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    // === 5. Intake worker ===
    let source = KafkaCommandSource::connect(
        &config.kafka_brokers,
        &config.consumer_group,
        &config.received_queue,
    )?;
    let handler = Arc::new(PgEventCommandHandler::new(pool.clone(), IntakeValidator::default()));
    let dispatcher = CommandDispatcher::new(CommandRegistry::new(handler), metrics.clone());
    let worker = IntakeDispatchWorker::new(
        source,
        dispatcher,
        metrics.clone(),
        WorkerOptions {
            max_concurrent_calls: config.max_concurrent_calls,
            ..WorkerOptions::default()
        },
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("⏹️  Shutdown signal received"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
            }
            shutdown.cancel();
        }
    });

    let report = worker.run(shutdown).await;

    // === 6. Shutdown ===
    server_handle.stop(true).await;
    if let Err(e) = server_task.await? {
        tracing::error!(error = %e, "HTTP server error");
    }
    pool.close().await;

    tracing::info!(
        completed = report.completed,
        ignored = report.ignored,
        dropped = report.dropped,
        faults = report.faults,
        "👋 Shutdown complete"
    );

    Ok(())
}
