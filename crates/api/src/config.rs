use std::env;

use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// HTTP server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  pub cors_origin: String,
}

impl ServerConfig {
  pub fn from_env() -> Result<Self> {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match env::var("PORT") {
      Ok(port) => port.parse().with_context(|| format!("PORT must be a number, got `{port}`"))?,
      Err(_) => DEFAULT_PORT,
    };
    let cors_origin = env::var("TEMPUS_CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

    Ok(Self {
      host,
      port,
      cors_origin,
    })
  }

  pub fn server_url(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: DEFAULT_HOST.to_string(),
      port: DEFAULT_PORT,
      cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
    }
  }
}
