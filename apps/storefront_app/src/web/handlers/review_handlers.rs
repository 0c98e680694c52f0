// apps/storefront_app/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::models::PageRequest;
use tracing::instrument;
use uuid::Uuid;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateReviewPayload {
  pub product_id: Uuid,
  pub rating: i32,
  #[serde(default)]
  pub comment: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateReviewPayload {
  pub rating: i32,
  pub comment: Option<String>,
}

#[instrument(name = "handler::create_review", skip(app_state, user, body), fields(user_id = %user.id(), product_id = %body.product_id))]
pub async fn create_review(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<CreateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let body = body.into_inner();
  let review = app_state
    .services
    .reviews
    .create(user.id(), body.product_id, body.rating, body.comment)
    .await?;
  Ok(HttpResponse::Created().json(review))
}

/// Reviews for one product plus its current average rating.
#[instrument(name = "handler::product_reviews", skip(app_state))]
pub async fn product_reviews(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let reviews = &app_state.services.reviews;
  let page = reviews.product_reviews(product_id, query.into_inner()).await?;
  let average = reviews.average_rating(product_id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "average_rating": average,
    "reviews": page
  })))
}

#[instrument(name = "handler::my_reviews", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn my_reviews(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let reviews = app_state.services.reviews.user_reviews(user.id()).await?;
  Ok(HttpResponse::Ok().json(reviews))
}

#[instrument(name = "handler::update_review", skip(app_state, user, body), fields(user_id = %user.id()))]
pub async fn update_review(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<UpdateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let body = body.into_inner();
  let review = app_state
    .services
    .reviews
    .update(user.id(), path.into_inner(), body.rating, body.comment)
    .await?;
  Ok(HttpResponse::Ok().json(review))
}

#[instrument(name = "handler::delete_review", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn delete_review(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.reviews.delete(user.id(), path.into_inner()).await?;
  Ok(message("review deleted"))
}
