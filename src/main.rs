use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use user_api::api::routes::create_routes;
use user_api::config::{init_tracing, run_migrations, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log)?;

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(config: Config) -> Result<()> {
    info!(
        driver = %config.database.driver,
        port = config.server.port,
        log_level = %config.log.level,
        log_format = ?config.log.format,
        "Starting user API"
    );

    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool, config.database.driver)
        .await
        .context("Failed to run database migrations")?;

    info!("Database ready");

    let app = create_routes(pool);

    let address = config.server.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("User API listening on http://{}", address);
    info!("Swagger UI available at http://{}/swagger", address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
