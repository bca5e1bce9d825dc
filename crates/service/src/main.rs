//! Prepare a database for the playlist core: connect, check, migrate.

use tunehost_service::telemetry::init_tracing;
use tunehost_service::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = AppConfig::from_env()?;
    tracing::info!(
        max_connections = config.pool.max_connections,
        "Loaded configuration"
    );

    // --- Database ---
    let pool = tunehost_db::create_pool(&config.pool).await?;
    tracing::info!("Database connection pool created");

    tunehost_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    tunehost_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    pool.close().await;
    Ok(())
}
