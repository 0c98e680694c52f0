// apps/storefront_app/src/main.rs

mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_web::middleware::from_fn;
use actix_web::{web as actix_data, App, HttpServer};
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront::access_log::AccessLogQueue;
use storefront::files::LocalFileStore;
use storefront::{PgStore, Services, TokenIssuer};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(anyhow::anyhow!("configuration error: {}", e));
    }
  };

  let db_pool = PgPoolOptions::new()
    .max_connections(10)
    .connect(&app_config.database_url)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "Failed to connect to the database.");
      e
    })?;
  tracing::info!("Connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations applied.");
  }

  let store = Arc::new(PgStore::new(db_pool));
  let files = Arc::new(LocalFileStore::new(
    app_config.upload_dir.clone(),
    app_config.max_upload_bytes,
  ));
  let tokens = TokenIssuer::new(&app_config.jwt_secret, Duration::hours(app_config.jwt_ttl_hours));
  let services = Services::new(
    store.clone(),
    files,
    tokens.clone(),
    Duration::hours(app_config.download_link_ttl_hours),
  )?;
  let (access_log, log_writer) = AccessLogQueue::spawn(store, app_config.access_log_queue_capacity);

  let app_state = AppState {
    services,
    tokens,
    access_log,
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  let payload_limit = app_config.max_upload_bytes;
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(actix_data::PayloadConfig::new(payload_limit))
      .wrap(from_fn(web::middleware::record_access))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  // The server's app states own the last queue handles; once they are gone
  // the writer drains whatever is still buffered.
  match tokio::time::timeout(std::time::Duration::from_secs(5), log_writer).await {
    Ok(Ok(())) => {}
    Ok(Err(e)) => tracing::warn!(error = %e, "Access log writer ended abnormally."),
    Err(_) => tracing::warn!("Access log writer did not drain in time."),
  }
  tracing::info!("Storefront server stopped.");
  Ok(())
}
