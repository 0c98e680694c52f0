// apps/storefront_app/src/state.rs

use crate::config::AppConfig;
use std::sync::Arc;
use storefront::access_log::AccessLogQueue;
use storefront::{Services, TokenIssuer};

#[derive(Clone)]
pub struct AppState {
  pub services: Services,
  pub tokens: TokenIssuer,
  pub access_log: AccessLogQueue,
  pub config: Arc<AppConfig>,
}
