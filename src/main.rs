use std::{env, sync::Arc};

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tempus_api::config::ServerConfig;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  let log_level = env::var("TEMPUS_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
  let db_url = env::var("DATABASE_URL").context("DATABASE_URL is not set in .env file")?;
  let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
    Ok(value) => value
      .parse::<u32>()
      .with_context(|| format!("DATABASE_MAX_CONNECTIONS must be a number, got `{value}`"))?,
    Err(_) => DEFAULT_MAX_CONNECTIONS,
  };

  let env_filter = EnvFilter::from_default_env().add_directive(log_level.parse()?);

  // Initialize tracing subscriber with the environment filter
  tracing_subscriber::fmt().with_env_filter(env_filter).init();

  let server_config = ServerConfig::from_env()?;

  let cancel_token = CancellationToken::new();

  // Start task for catching interrupt
  tokio::spawn({
    let cancel_token = cancel_token.clone();
    async move {
      let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
      };

      #[cfg(unix)]
      let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
          .expect("failed to install signal handler")
          .recv()
          .await;
      };

      #[cfg(not(unix))]
      let terminate = std::future::pending::<()>();

      tokio::select! {
        _ = ctrl_c => {
          info!("Received Ctrl-C, shutting down...");
          cancel_token.cancel()
        },
        _ = terminate => {
          info!("Received terminate, shutting down...");
          cancel_token.cancel()
        },
      }
    }
  });

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(&db_url)
    .await
    .context("Database connection failed")?;

  if let Err(err) = tempus_api::migrate(&pool).await {
    error!("Failed migrations: {}", err);
    pool.close().await;

    return Err(err.into());
  }

  info!("Database migrations applied");

  let shared_pool = Arc::new(pool);

  let result = tempus_api::run(shared_pool.clone(), server_config, cancel_token).await;
  if let Err(err) = &result {
    error!("Api server stopped with error: {:?}", err);
  }

  shared_pool.close().await;

  result
}
