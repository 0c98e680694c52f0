// core/src/services/review_service.rs

use crate::auth::Identity;
use crate::error::{ShopError, ShopResult};
use crate::models::{OrderStatus, Page, PageRequest, Review, DEFAULT_PAGE_LIMIT};
use crate::store::{OrderStore, ProductStore, ReviewStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ReviewService {
  reviews: Arc<dyn ReviewStore>,
  products: Arc<dyn ProductStore>,
  orders: Arc<dyn OrderStore>,
}

fn check_rating(rating: i32) -> ShopResult<()> {
  if !(1..=5).contains(&rating) {
    return Err(ShopError::validation("rating must be between 1 and 5"));
  }
  Ok(())
}

impl ReviewService {
  pub fn new(reviews: Arc<dyn ReviewStore>, products: Arc<dyn ProductStore>, orders: Arc<dyn OrderStore>) -> Self {
    Self {
      reviews,
      products,
      orders,
    }
  }

  /// Only buyers with a completed, paid order may review a product.
  #[instrument(name = "reviews::create", skip(self, comment))]
  pub async fn create(&self, user_id: Uuid, product_id: Uuid, rating: i32, comment: String) -> ShopResult<Review> {
    check_rating(rating)?;
    self
      .products
      .find_product(product_id)
      .await?
      .ok_or_else(|| ShopError::not_found("product not found"))?;
    let order = self
      .orders
      .find_paid_order(user_id, product_id)
      .await?
      .filter(|o| o.status == OrderStatus::Completed)
      .ok_or_else(|| ShopError::invalid_state("you must purchase this product before reviewing it"))?;

    let now = Utc::now();
    let review = Review {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      order_id: order.id,
      rating,
      comment,
      is_verified_purchase: true,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };
    self.reviews.insert_review(&review).await?;
    info!(review_id = %review.id, rating, "Review created.");
    self.refresh_rating(product_id).await;
    Ok(review)
  }

  /// Recomputes the product's cached average. Failures only leave the cached
  /// value stale.
  async fn refresh_rating(&self, product_id: Uuid) {
    let result = match self.reviews.average_rating(product_id).await {
      Ok(average) => self.products.set_product_rating(product_id, average).await,
      Err(e) => Err(e),
    };
    if let Err(e) = result {
      warn!(%product_id, error = %e, "Failed to refresh product rating.");
    }
  }

  pub async fn product_reviews(&self, product_id: Uuid, page: PageRequest) -> ShopResult<Page<Review>> {
    self
      .reviews
      .list_product_reviews(product_id, page.normalized(DEFAULT_PAGE_LIMIT))
      .await
  }

  pub async fn user_reviews(&self, user_id: Uuid) -> ShopResult<Vec<Review>> {
    self.reviews.list_user_reviews(user_id).await
  }

  async fn find(&self, id: Uuid) -> ShopResult<Review> {
    self
      .reviews
      .find_review(id)
      .await?
      .ok_or_else(|| ShopError::not_found("review not found"))
  }

  pub async fn update(&self, user_id: Uuid, id: Uuid, rating: i32, comment: Option<String>) -> ShopResult<Review> {
    check_rating(rating)?;
    let mut review = self.find(id).await?;
    if review.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    review.rating = rating;
    if let Some(comment) = comment {
      review.comment = comment;
    }
    review.updated_at = Utc::now();
    self.reviews.update_review(&review).await?;
    self.refresh_rating(review.product_id).await;
    Ok(review)
  }

  pub async fn delete(&self, user_id: Uuid, id: Uuid) -> ShopResult<()> {
    let review = self.find(id).await?;
    if review.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    self.reviews.soft_delete_review(id).await?;
    self.refresh_rating(review.product_id).await;
    Ok(())
  }

  #[instrument(name = "reviews::admin_delete", skip(self), fields(admin_id = %admin.user_id))]
  pub async fn admin_delete(&self, admin: Identity, id: Uuid) -> ShopResult<()> {
    admin.require_admin()?;
    let review = self.find(id).await?;
    self.reviews.soft_delete_review(id).await?;
    self.refresh_rating(review.product_id).await;
    Ok(())
  }

  pub async fn average_rating(&self, product_id: Uuid) -> ShopResult<f64> {
    self.reviews.average_rating(product_id).await
  }
}
