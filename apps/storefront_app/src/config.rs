// apps/storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use storefront::files::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  pub jwt_secret: String,
  pub jwt_ttl_hours: i64,

  pub upload_dir: PathBuf,
  pub max_upload_bytes: usize,
  pub download_link_ttl_hours: i64,

  pub access_log_queue_capacity: usize,
  pub run_migrations: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!(
      host = %config.server_host,
      port = config.server_port,
      upload_dir = %config.upload_dir.display(),
      "Application configuration loaded."
    );
    Ok(config)
  }

  /// Builds the config from any variable source. `from_env` passes the
  /// process environment; tests pass a map.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |name: &str| {
      lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };

    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;
    let database_url = required("DATABASE_URL")?;
    let jwt_secret = required("JWT_SECRET")?;
    let jwt_ttl_hours = positive(parse_or(&lookup, "JWT_TTL_HOURS", 24i64)?, "JWT_TTL_HOURS")?;
    let upload_dir = PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string()));
    let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
    let download_link_ttl_hours = positive(
      parse_or(&lookup, "DOWNLOAD_LINK_TTL_HOURS", 24i64)?,
      "DOWNLOAD_LINK_TTL_HOURS",
    )?;
    let access_log_queue_capacity = parse_or(&lookup, "ACCESS_LOG_QUEUE_CAPACITY", 1024usize)?;
    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      jwt_ttl_hours,
      upload_dir,
      max_upload_bytes,
      download_link_ttl_hours,
      access_log_queue_capacity,
      run_migrations,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
    None => Ok(default),
  }
}

fn positive(value: i64, name: &str) -> Result<i64> {
  if value > 0 {
    Ok(value)
  } else {
    Err(AppError::Config(format!("{} must be greater than 0", name)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/shop"),
      ("JWT_SECRET", "s3cret"),
    ]))
    .unwrap();

    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.jwt_ttl_hours, 24);
    assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(config.download_link_ttl_hours, 24);
    assert_eq!(config.access_log_queue_capacity, 1024);
    assert!(config.run_migrations);
  }

  #[test]
  fn missing_secret_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("JWT_SECRET")));
  }

  #[test]
  fn malformed_values_are_rejected() {
    let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "k")];

    let mut vars = base.to_vec();
    vars.push(("SERVER_PORT", "eighty"));
    assert!(matches!(AppConfig::from_lookup(lookup_from(&vars)), Err(AppError::Config(_))));

    let mut vars = base.to_vec();
    vars.push(("RUN_MIGRATIONS", "maybe"));
    assert!(matches!(AppConfig::from_lookup(lookup_from(&vars)), Err(AppError::Config(_))));

    let mut vars = base.to_vec();
    vars.push(("JWT_TTL_HOURS", "0"));
    assert!(matches!(AppConfig::from_lookup(lookup_from(&vars)), Err(AppError::Config(_))));
  }

  #[test]
  fn overrides_are_honoured() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://x"),
      ("JWT_SECRET", "k"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "9000"),
      ("UPLOAD_DIR", "/var/shop"),
      ("RUN_MIGRATIONS", "false"),
    ]))
    .unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert_eq!(config.upload_dir, PathBuf::from("/var/shop"));
    assert!(!config.run_migrations);
  }
}
