// apps/storefront_app/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use storefront::models::{CategoryRequest, NewProduct, PageRequest, ProductFilter, ProductUpdate};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{message, raw_upload};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
  #[serde(default)]
  pub page: i64,
  #[serde(default)]
  pub limit: i64,
  pub category_id: Option<Uuid>,
  pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
  #[serde(default)]
  pub limit: i64,
}

// --- Categories ---

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.services.catalog.list_categories().await?;
  Ok(HttpResponse::Ok().json(categories))
}

#[instrument(name = "handler::get_category", skip(app_state))]
pub async fn get_category(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let category = app_state.services.catalog.get_category(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::get_category_by_slug", skip(app_state))]
pub async fn get_category_by_slug(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let category = app_state.services.catalog.get_category_by_slug(&path).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::category_products", skip(app_state, query))]
pub async fn category_products(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state
    .services
    .catalog
    .products_by_category(path.into_inner(), query.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::create_category", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn create_category(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
  let category = app_state.services.catalog.create_category(body.into_inner()).await?;
  info!(category_id = %category.id, slug = %category.slug, "Category created.");
  Ok(HttpResponse::Created().json(category))
}

#[instrument(name = "handler::update_category", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn update_category(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
  let category = app_state
    .services
    .catalog
    .update_category(path.into_inner(), body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::delete_category", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn delete_category(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.catalog.delete_category(path.into_inner()).await?;
  Ok(message("category deleted"))
}

// --- Products ---

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products(
  app_state: web::Data<AppState>,
  query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let filter = ProductFilter {
    category_id: query.category_id,
    search: query.search,
  };
  let page = app_state
    .services
    .catalog
    .list_products(&filter, PageRequest::new(query.page, query.limit))
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::featured_products", skip(app_state))]
pub async fn featured_products(
  app_state: web::Data<AppState>,
  query: web::Query<FeaturedQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.services.catalog.featured_products(query.limit).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state))]
pub async fn get_product(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let product = app_state.services.catalog.get_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::get_product_by_slug", skip(app_state))]
pub async fn get_product_by_slug(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.services.catalog.get_product_by_slug(&path).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::create_product", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn create_product(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  body: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .services
    .catalog
    .create_product(admin.0.user_id, body.into_inner(), None)
    .await?;
  info!(product_id = %product.id, slug = %product.slug, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn update_product(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<ProductUpdate>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .services
    .catalog
    .update_product(path.into_inner(), body.into_inner(), None)
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

/// Replaces the preview image with the raw request body.
#[instrument(name = "handler::upload_product_image", skip(app_state, admin, req, body), fields(admin_id = %admin.0.user_id, bytes = body.len()))]
pub async fn upload_product_image(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  path: web::Path<Uuid>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let image = raw_upload(&req, body, "preview");
  let product = app_state
    .services
    .catalog
    .update_product(path.into_inner(), ProductUpdate::default(), Some(image))
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn delete_product(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.catalog.delete_product(path.into_inner()).await?;
  Ok(message("product deleted"))
}
