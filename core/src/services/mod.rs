// core/src/services/mod.rs

//! Business operations, one service per area. Services own `Arc`s of the
//! store traits they need and are cheap to clone.

pub mod analytics_service;
pub mod cart_service;
pub mod catalog_service;
pub mod custom_order_service;
pub mod download_service;
pub mod notification_service;
pub mod order_service;
pub mod review_service;
pub mod user_service;
pub mod wishlist_service;

pub use analytics_service::AnalyticsService;
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use custom_order_service::CustomOrderService;
pub use download_service::DownloadService;
pub use notification_service::NotificationService;
pub use order_service::OrderService;
pub use review_service::ReviewService;
pub use user_service::{AdminUserUpdate, AuthResponse, LoginRequest, OAuthProfile, ProfileUpdate, RegisterRequest, UserService};
pub use wishlist_service::WishlistService;

use crate::auth::TokenIssuer;
use crate::error::ShopResult;
use crate::files::FileStore;
use crate::store::Store;
use crate::workflows::WorkflowDeps;
use chrono::Duration;
use std::sync::Arc;

/// Every service, wired against one backing store.
#[derive(Clone)]
pub struct Services {
  pub users: UserService,
  pub catalog: CatalogService,
  pub carts: CartService,
  pub wishlists: WishlistService,
  pub orders: OrderService,
  pub downloads: DownloadService,
  pub reviews: ReviewService,
  pub notifications: NotificationService,
  pub custom_orders: CustomOrderService,
  pub analytics: AnalyticsService,
}

impl Services {
  pub fn new<S>(store: Arc<S>, files: Arc<dyn FileStore>, tokens: TokenIssuer, download_ttl: Duration) -> ShopResult<Self>
  where
    S: Store + 'static,
  {
    let notifications = NotificationService::new(store.clone());
    let deps = WorkflowDeps {
      orders: store.clone(),
      products: store.clone(),
      files: files.clone(),
      notifications: notifications.clone(),
    };

    Ok(Self {
      users: UserService::new(store.clone(), tokens),
      catalog: CatalogService::new(store.clone(), store.clone(), files),
      carts: CartService::new(store.clone(), store.clone()),
      wishlists: WishlistService::new(store.clone(), store.clone()),
      orders: OrderService::new(deps)?,
      downloads: DownloadService::new(store.clone(), store.clone(), store.clone(), download_ttl),
      reviews: ReviewService::new(store.clone(), store.clone(), store.clone()),
      custom_orders: CustomOrderService::new(store.clone(), notifications.clone()),
      analytics: AnalyticsService::new(store.clone(), store.clone(), store),
      notifications,
    })
  }
}
