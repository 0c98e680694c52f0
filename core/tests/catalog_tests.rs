// tests/catalog_tests.rs
mod common;

use common::*;
use storefront::error::ShopError;
use storefront::models::{CategoryRequest, PageRequest, ProductFilter, ProductUpdate};
use uuid::Uuid;

#[tokio::test]
async fn category_names_must_be_unique_by_slug() {
  let shop = TestShop::new();
  let catalog = &shop.services.catalog;

  let created = catalog
    .create_category(CategoryRequest {
      name: "Web Templates".into(),
      description: "HTML and CSS".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(created.slug, "web-templates");
  assert!(created.is_active);

  let err = catalog
    .create_category(CategoryRequest {
      name: "web   templates!".into(),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(ref m) if m == "category with this name already exists"));

  assert_eq!(catalog.get_category_by_slug("web-templates").await.unwrap().id, created.id);
  assert!(matches!(
    catalog.get_category(Uuid::new_v4()).await,
    Err(ShopError::NotFound(ref m)) if m == "category not found"
  ));
}

#[tokio::test]
async fn renaming_a_category_regenerates_its_slug() {
  let shop = TestShop::new();
  let catalog = &shop.services.catalog;
  let a = catalog
    .create_category(CategoryRequest {
      name: "Scripts".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  catalog
    .create_category(CategoryRequest {
      name: "Themes".into(),
      ..Default::default()
    })
    .await
    .unwrap();

  let renamed = catalog
    .update_category(
      a.id,
      CategoryRequest {
        name: "Shell Scripts".into(),
        sort_order: Some(3),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(renamed.slug, "shell-scripts");
  assert_eq!(renamed.sort_order, 3);

  let err = catalog
    .update_category(
      a.id,
      CategoryRequest {
        name: "Themes".into(),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(_)));

  catalog.delete_category(a.id).await.unwrap();
  assert!(catalog.get_category(a.id).await.is_err());
}

#[tokio::test]
async fn product_creation_validates_category_title_and_price() {
  let shop = TestShop::new();
  let catalog = &shop.services.catalog;
  let category_id = shop.category("Tools").await;
  let admin = Uuid::new_v4();

  let err = catalog
    .create_product(admin, new_product("Ghost", Uuid::new_v4(), 1_000, None), None)
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::NotFound(ref m) if m == "category not found"));

  let err = catalog
    .create_product(admin, new_product("Freebie", category_id, 0, None), None)
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(_)));

  let err = catalog
    .create_product(admin, new_product("Overdiscounted", category_id, 1_000, Some(2_000)), None)
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(_)));

  let product = catalog
    .create_product(admin, new_product("Log Viewer", category_id, 1_000, None), Some(png()))
    .await
    .unwrap();
  assert_eq!(product.slug, "log-viewer");
  assert_eq!(product.preview_images.len(), 1);
  assert!(shop.files.contains(&product.preview_images[0]));

  let err = catalog
    .create_product(admin, new_product("Log  Viewer", category_id, 2_000, None), Some(png()))
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(ref m) if m == "product with this title already exists"));
  assert_eq!(shop.files.len(), 1);
}

#[tokio::test]
async fn listing_filters_active_products_by_category_and_search() {
  let shop = TestShop::new();
  let catalog = &shop.services.catalog;
  let tools = shop.category("Tools").await;
  let themes = shop.category("Themes").await;
  let admin = Uuid::new_v4();

  catalog
    .create_product(admin, new_product("Log Viewer", tools, 1_000, None), None)
    .await
    .unwrap();
  catalog
    .create_product(admin, new_product("Dark Theme", themes, 500, None), None)
    .await
    .unwrap();
  let mut hidden = new_product("Hidden Tool", tools, 700, None);
  hidden.is_active = false;
  catalog.create_product(admin, hidden, None).await.unwrap();

  let all = catalog.list_products(&ProductFilter::default(), PageRequest::default()).await.unwrap();
  assert_eq!(all.total, 2);

  let by_search = catalog
    .list_products(
      &ProductFilter {
        category_id: None,
        search: Some("VIEWER".into()),
      },
      PageRequest::default(),
    )
    .await
    .unwrap();
  assert_eq!(by_search.items.len(), 1);
  assert_eq!(by_search.items[0].title, "Log Viewer");

  let in_tools = catalog.products_by_category(tools, PageRequest::default()).await.unwrap();
  assert_eq!(in_tools.total, 1);
  assert!(catalog.products_by_category(Uuid::new_v4(), PageRequest::default()).await.is_err());

  assert_eq!(catalog.featured_products(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reads_count_views_and_updates_replace_images() {
  let shop = TestShop::new();
  let catalog = &shop.services.catalog;
  let tools = shop.category("Tools").await;
  let product = catalog
    .create_product(Uuid::new_v4(), new_product("Log Viewer", tools, 1_000, None), Some(png()))
    .await
    .unwrap();
  let old_image = product.preview_images[0].clone();

  catalog.get_product(product.id).await.unwrap();
  let viewed = catalog.get_product_by_slug("log-viewer").await.unwrap();
  assert_eq!(viewed.views_count, 2);

  let updated = catalog
    .update_product(
      product.id,
      ProductUpdate {
        title: Some("Log Viewer Pro".into()),
        discount_price_cents: Some(800),
        ..Default::default()
      },
      Some(png()),
    )
    .await
    .unwrap();
  assert_eq!(updated.slug, "log-viewer-pro");
  assert_eq!(updated.effective_price_cents(), 800);
  assert!(!shop.files.contains(&old_image));
  assert!(shop.files.contains(&updated.preview_images[0]));

  let err = catalog
    .update_product(
      product.id,
      ProductUpdate {
        price_cents: Some(500),
        ..Default::default()
      },
      None,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(_)));

  catalog.delete_product(product.id).await.unwrap();
  assert!(matches!(catalog.get_product(product.id).await, Err(ShopError::NotFound(_))));
}
