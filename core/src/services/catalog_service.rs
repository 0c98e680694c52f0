// core/src/services/catalog_service.rs

//! Categories and products.

use crate::error::{ShopError, ShopResult};
use crate::files::{FileStore, UploadedFile};
use crate::models::{
  Category, CategoryRequest, NewProduct, Page, PageRequest, Product, ProductFilter, ProductUpdate, DEFAULT_PAGE_LIMIT,
};
use crate::slug::slugify;
use crate::store::{CategoryStore, ProductStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const PRODUCT_IMAGE_FOLDER: &str = "products";

#[derive(Clone)]
pub struct CatalogService {
  categories: Arc<dyn CategoryStore>,
  products: Arc<dyn ProductStore>,
  files: Arc<dyn FileStore>,
}

fn validate_pricing(price_cents: i64, discount_price_cents: Option<i64>) -> ShopResult<()> {
  if price_cents <= 0 {
    return Err(ShopError::validation("price must be greater than 0"));
  }
  if let Some(discount) = discount_price_cents {
    if discount < 0 || discount > price_cents {
      return Err(ShopError::validation("discount price must be between 0 and the price"));
    }
  }
  Ok(())
}

fn name_slug(name: &str, what: &str) -> ShopResult<String> {
  let slug = slugify(name);
  if slug.is_empty() {
    return Err(ShopError::validation(format!("{} is required", what)));
  }
  Ok(slug)
}

impl CatalogService {
  pub fn new(categories: Arc<dyn CategoryStore>, products: Arc<dyn ProductStore>, files: Arc<dyn FileStore>) -> Self {
    Self {
      categories,
      products,
      files,
    }
  }

  // --- categories ---

  #[instrument(name = "catalog::create_category", skip_all, fields(name = %req.name))]
  pub async fn create_category(&self, req: CategoryRequest) -> ShopResult<Category> {
    let slug = name_slug(&req.name, "name")?;
    if self.categories.find_category_by_slug(&slug).await?.is_some() {
      return Err(ShopError::validation("category with this name already exists"));
    }

    let now = Utc::now();
    let category = Category {
      id: Uuid::new_v4(),
      name: req.name.trim().to_string(),
      slug,
      description: req.description,
      icon: req.icon,
      parent_id: req.parent_id,
      sort_order: req.sort_order.unwrap_or(0),
      is_active: req.is_active.unwrap_or(true),
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };
    match self.categories.insert_category(&category).await {
      Ok(()) => {
        info!(category_id = %category.id, slug = %category.slug, "Category created.");
        Ok(category)
      }
      Err(ShopError::Conflict(_)) => Err(ShopError::validation("category with this name already exists")),
      Err(e) => Err(e),
    }
  }

  pub async fn list_categories(&self) -> ShopResult<Vec<Category>> {
    self.categories.list_categories().await
  }

  pub async fn get_category(&self, id: Uuid) -> ShopResult<Category> {
    self
      .categories
      .find_category(id)
      .await?
      .ok_or_else(|| ShopError::not_found("category not found"))
  }

  pub async fn get_category_by_slug(&self, slug: &str) -> ShopResult<Category> {
    self
      .categories
      .find_category_by_slug(slug)
      .await?
      .ok_or_else(|| ShopError::not_found("category not found"))
  }

  #[instrument(name = "catalog::update_category", skip(self, req))]
  pub async fn update_category(&self, id: Uuid, req: CategoryRequest) -> ShopResult<Category> {
    let mut category = self.get_category(id).await?;

    if !req.name.trim().is_empty() && req.name.trim() != category.name {
      let slug = name_slug(&req.name, "name")?;
      if let Some(existing) = self.categories.find_category_by_slug(&slug).await? {
        if existing.id != category.id {
          return Err(ShopError::validation("category with this name already exists"));
        }
      }
      category.name = req.name.trim().to_string();
      category.slug = slug;
    }
    if !req.description.is_empty() {
      category.description = req.description;
    }
    if req.icon.is_some() {
      category.icon = req.icon;
    }
    if req.parent_id.is_some() {
      category.parent_id = req.parent_id;
    }
    if let Some(sort_order) = req.sort_order {
      category.sort_order = sort_order;
    }
    if let Some(is_active) = req.is_active {
      category.is_active = is_active;
    }
    category.updated_at = Utc::now();

    match self.categories.update_category(&category).await {
      Ok(()) => Ok(category),
      Err(ShopError::Conflict(_)) => Err(ShopError::validation("category with this name already exists")),
      Err(e) => Err(e),
    }
  }

  pub async fn delete_category(&self, id: Uuid) -> ShopResult<()> {
    self.get_category(id).await?;
    self.categories.soft_delete_category(id).await
  }

  // --- products ---

  async fn ensure_title_free(&self, slug: &str, except: Option<Uuid>) -> ShopResult<()> {
    match self.products.find_product_by_slug(slug).await? {
      Some(existing) if Some(existing.id) != except => {
        Err(ShopError::validation("product with this title already exists"))
      }
      _ => Ok(()),
    }
  }

  /// Creates a product, storing `image` as its first preview. The image is
  /// removed again if the product cannot be saved.
  #[instrument(name = "catalog::create_product", skip_all, fields(title = %req.title))]
  pub async fn create_product(
    &self,
    created_by: Uuid,
    req: NewProduct,
    image: Option<UploadedFile>,
  ) -> ShopResult<Product> {
    let slug = name_slug(&req.title, "title")?;
    validate_pricing(req.price_cents, req.discount_price_cents)?;
    self.get_category(req.category_id).await?;
    self.ensure_title_free(&slug, None).await?;

    let image_path = match image {
      Some(file) => Some(self.files.store(PRODUCT_IMAGE_FOLDER, &file).await?),
      None => None,
    };

    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      title: req.title.trim().to_string(),
      slug,
      description: req.description,
      category_id: req.category_id,
      product_type: req.product_type,
      price_cents: req.price_cents,
      discount_price_cents: req.discount_price_cents,
      preview_images: image_path.iter().cloned().collect(),
      demo_url: req.demo_url,
      file_url: req.file_url,
      tech_stack: req.tech_stack,
      features: req.features,
      requirements: req.requirements,
      downloads_count: 0,
      views_count: 0,
      rating_average: 0.0,
      is_active: req.is_active,
      created_by,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };

    if let Err(e) = self.products.insert_product(&product).await {
      if let Some(path) = &image_path {
        if let Err(cleanup) = self.files.delete(path).await {
          warn!(path = %path, error = %cleanup, "Failed to remove image of unsaved product.");
        }
      }
      return Err(match e {
        ShopError::Conflict(_) => ShopError::validation("product with this title already exists"),
        other => other,
      });
    }

    info!(product_id = %product.id, slug = %product.slug, "Product created.");
    Ok(product)
  }

  pub async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> ShopResult<Page<Product>> {
    self
      .products
      .list_products(filter, page.normalized(DEFAULT_PAGE_LIMIT))
      .await
  }

  async fn count_view(&self, product: &mut Product) {
    match self.products.increment_product_views(product.id).await {
      Ok(()) => product.views_count += 1,
      Err(e) => warn!(product_id = %product.id, error = %e, "Failed to count product view."),
    }
  }

  /// Fetches a product and counts the view.
  pub async fn get_product(&self, id: Uuid) -> ShopResult<Product> {
    let mut product = self
      .products
      .find_product(id)
      .await?
      .ok_or_else(|| ShopError::not_found("product not found"))?;
    self.count_view(&mut product).await;
    Ok(product)
  }

  pub async fn get_product_by_slug(&self, slug: &str) -> ShopResult<Product> {
    let mut product = self
      .products
      .find_product_by_slug(slug)
      .await?
      .ok_or_else(|| ShopError::not_found("product not found"))?;
    self.count_view(&mut product).await;
    Ok(product)
  }

  #[instrument(name = "catalog::update_product", skip(self, req, image))]
  pub async fn update_product(
    &self,
    id: Uuid,
    req: ProductUpdate,
    image: Option<UploadedFile>,
  ) -> ShopResult<Product> {
    let mut product = self
      .products
      .find_product(id)
      .await?
      .ok_or_else(|| ShopError::not_found("product not found"))?;

    if let Some(title) = req.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      if title != product.title {
        let slug = name_slug(title, "title")?;
        self.ensure_title_free(&slug, Some(product.id)).await?;
        product.title = title.to_string();
        product.slug = slug;
      }
    }
    if let Some(category_id) = req.category_id {
      self.get_category(category_id).await?;
      product.category_id = category_id;
    }
    if let Some(description) = req.description {
      product.description = description;
    }
    if let Some(product_type) = req.product_type {
      product.product_type = product_type;
    }
    if let Some(price) = req.price_cents {
      product.price_cents = price;
    }
    if req.discount_price_cents.is_some() {
      product.discount_price_cents = req.discount_price_cents;
    }
    validate_pricing(product.price_cents, product.discount_price_cents)?;
    if req.demo_url.is_some() {
      product.demo_url = req.demo_url;
    }
    if req.file_url.is_some() {
      product.file_url = req.file_url;
    }
    if let Some(tech_stack) = req.tech_stack {
      product.tech_stack = tech_stack;
    }
    if let Some(features) = req.features {
      product.features = features;
    }
    if let Some(requirements) = req.requirements {
      product.requirements = requirements;
    }
    if let Some(is_active) = req.is_active {
      product.is_active = is_active;
    }

    let replaced = match image {
      Some(file) => {
        let path = self.files.store(PRODUCT_IMAGE_FOLDER, &file).await?;
        let old = std::mem::replace(&mut product.preview_images, vec![path]);
        Some(old)
      }
      None => None,
    };
    product.updated_at = Utc::now();

    if let Err(e) = self.products.update_product(&product).await {
      if replaced.is_some() {
        for path in &product.preview_images {
          if let Err(cleanup) = self.files.delete(path).await {
            warn!(path = %path, error = %cleanup, "Failed to remove image of unsaved product update.");
          }
        }
      }
      return Err(match e {
        ShopError::Conflict(_) => ShopError::validation("product with this title already exists"),
        other => other,
      });
    }

    for path in replaced.into_iter().flatten() {
      if let Err(e) = self.files.delete(&path).await {
        warn!(path = %path, error = %e, "Failed to remove replaced product image.");
      }
    }
    Ok(product)
  }

  pub async fn delete_product(&self, id: Uuid) -> ShopResult<()> {
    self
      .products
      .find_product(id)
      .await?
      .ok_or_else(|| ShopError::not_found("product not found"))?;
    self.products.soft_delete_product(id).await
  }

  /// Newest active products.
  pub async fn featured_products(&self, limit: i64) -> ShopResult<Vec<Product>> {
    let page = PageRequest::new(1, limit).normalized(DEFAULT_PAGE_LIMIT);
    Ok(self.products.list_products(&ProductFilter::default(), page).await?.items)
  }

  pub async fn products_by_category(&self, category_id: Uuid, page: PageRequest) -> ShopResult<Page<Product>> {
    self.get_category(category_id).await?;
    let filter = ProductFilter {
      category_id: Some(category_id),
      search: None,
    };
    self.list_products(&filter, page).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pricing_rules() {
    assert!(validate_pricing(1000, None).is_ok());
    assert!(validate_pricing(1000, Some(0)).is_ok());
    assert!(validate_pricing(1000, Some(1000)).is_ok());
    assert!(matches!(validate_pricing(0, None), Err(ShopError::Validation(_))));
    assert!(matches!(validate_pricing(1000, Some(1001)), Err(ShopError::Validation(_))));
    assert!(matches!(validate_pricing(1000, Some(-1)), Err(ShopError::Validation(_))));
  }

  #[test]
  fn blank_names_have_no_slug() {
    assert!(matches!(name_slug("  !! ", "name"), Err(ShopError::Validation(_))));
    assert_eq!(name_slug("Web Templates", "name").unwrap(), "web-templates");
  }
}
