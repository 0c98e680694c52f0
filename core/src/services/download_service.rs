// core/src/services/download_service.rs

//! Download grants for paid orders.

use crate::error::{ShopError, ShopResult};
use crate::models::{Download, Page, PageRequest, PaymentStatus, DEFAULT_PAGE_LIMIT};
use crate::store::{DownloadStore, OrderStore, ProductStore};
use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct DownloadService {
  orders: Arc<dyn OrderStore>,
  products: Arc<dyn ProductStore>,
  downloads: Arc<dyn DownloadStore>,
  link_ttl: Duration,
}

fn download_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, b| {
    let _ = write!(out, "{:02x}", b);
    out
  })
}

impl DownloadService {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    downloads: Arc<dyn DownloadStore>,
    link_ttl: Duration,
  ) -> Self {
    Self {
      orders,
      products,
      downloads,
      link_ttl,
    }
  }

  /// True iff some order of this user for this product is paid.
  pub async fn can_download(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<bool> {
    Ok(self.orders.find_paid_order(user_id, product_id).await?.is_some())
  }

  #[instrument(name = "downloads::create", skip(self))]
  pub async fn create_download(&self, user_id: Uuid, order_id: Uuid, product_id: Uuid) -> ShopResult<Download> {
    let order = self
      .orders
      .find_order(order_id)
      .await?
      .ok_or_else(|| ShopError::not_found("order not found"))?;
    if !order.is_owned_by(user_id) {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    if order.payment_status != PaymentStatus::Paid {
      return Err(ShopError::invalid_state("order is not paid"));
    }
    if order.product_id != Some(product_id) {
      return Err(ShopError::validation("product does not match order"));
    }

    let now = Utc::now();
    let download = Download {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      order_id,
      download_token: download_token(),
      expires_at: now + self.link_ttl,
      is_used: false,
      downloaded_at: None,
      created_at: now,
    };
    self.downloads.insert_download(&download).await?;
    info!(download_id = %download.id, expires_at = %download.expires_at, "Download granted.");

    if let Err(e) = self.products.increment_product_downloads(product_id).await {
      warn!(%product_id, error = %e, "Failed to count product download.");
    }
    Ok(download)
  }

  pub async fn list_user_downloads(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Download>> {
    self
      .downloads
      .list_user_downloads(user_id, page.normalized(DEFAULT_PAGE_LIMIT))
      .await
  }

  pub async fn download_history(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Vec<Download>> {
    self.downloads.download_history(user_id, product_id).await
  }
}
