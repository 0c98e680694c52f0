// tests/shop_services_tests.rs
mod common;

use chrono::{Duration, Utc};
use common::*;
use std::sync::Arc;
use storefront::access_log::AccessLogQueue;
use storefront::error::ShopError;
use storefront::models::{
  ApiLog, AuthProvider, CustomOrderStatus, NewCustomOrder, NotificationKind, OrderStatus, PageRequest,
  ProcessCustomOrder, Role,
};
use storefront::services::{AdminUserUpdate, LoginRequest, OAuthProfile, ProfileUpdate, RegisterRequest};
use uuid::Uuid;

#[tokio::test]
async fn cart_merges_lines_and_prices_with_discounts() {
  let shop = TestShop::new();
  let buyer = shop.user("buyer@example.com").await;
  let other = shop.user("other@example.com").await;
  let kit = shop.product("Invoice Kit", 1_000, Some(800)).await;
  let theme = shop.product("Dark Theme", 500, Some(0)).await;
  let carts = &shop.services.carts;

  let first = carts.add(buyer.user_id, kit.id, 1).await.unwrap();
  let merged = carts.add(buyer.user_id, kit.id, 2).await.unwrap();
  assert_eq!(first.id, merged.id);
  assert_eq!(merged.quantity, 3);
  carts.add(buyer.user_id, theme.id, 1).await.unwrap();

  let view = carts.view(buyer.user_id).await.unwrap();
  assert_eq!(view.lines.len(), 2);
  assert_eq!(view.total_cents, 3 * 800 + 500);

  assert!(matches!(carts.add(buyer.user_id, kit.id, 0).await, Err(ShopError::Validation(_))));
  assert!(matches!(
    carts.update_quantity(other.user_id, merged.id, 1).await,
    Err(ShopError::Unauthorized(_))
  ));
  assert_eq!(carts.update_quantity(buyer.user_id, merged.id, 1).await.unwrap().quantity, 1);

  carts.remove(buyer.user_id, merged.id).await.unwrap();
  assert_eq!(carts.view(buyer.user_id).await.unwrap().total_cents, 500);
  carts.clear(buyer.user_id).await.unwrap();
  assert!(carts.view(buyer.user_id).await.unwrap().lines.is_empty());

  let bundle = shop.product("Agency Bundle", 10_000_000_000_000_000, None).await;
  carts.add(buyer.user_id, bundle.id, 1_000).await.unwrap();
  let err = carts.view(buyer.user_id).await.unwrap_err();
  assert!(matches!(err, ShopError::Validation(ref m) if m == "cart total is too large"));
  carts.clear(buyer.user_id).await.unwrap();

  let full = carts.add(buyer.user_id, theme.id, i32::MAX).await.unwrap();
  let err = carts.add(buyer.user_id, theme.id, 1).await.unwrap_err();
  assert!(matches!(err, ShopError::Validation(ref m) if m == "cart quantity is too large"));
  let view = carts.view(buyer.user_id).await.unwrap();
  assert_eq!(view.lines.len(), 1);
  assert_eq!(view.lines[0].item.id, full.id);
  assert_eq!(view.lines[0].item.quantity, i32::MAX);
}

#[tokio::test]
async fn wishlist_rejects_duplicates() {
  let shop = TestShop::new();
  let buyer = shop.user("buyer@example.com").await;
  let kit = shop.product("Invoice Kit", 1_000, None).await;
  let wishlists = &shop.services.wishlists;

  let item = wishlists.add(buyer.user_id, kit.id).await.unwrap();
  let err = wishlists.add(buyer.user_id, kit.id).await.unwrap_err();
  assert!(matches!(err, ShopError::Validation(ref m) if m == "product already in wishlist"));
  assert!(wishlists.contains(buyer.user_id, kit.id).await.unwrap());
  assert!(matches!(
    wishlists.add(buyer.user_id, Uuid::new_v4()).await,
    Err(ShopError::NotFound(_))
  ));

  wishlists.remove(buyer.user_id, item.id).await.unwrap();
  assert!(!wishlists.contains(buyer.user_id, kit.id).await.unwrap());
  assert!(wishlists.list(buyer.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn downloads_require_a_paid_matching_order() {
  let shop = TestShop::new();
  let buyer = shop.user("buyer@example.com").await;
  let stranger = shop.user("stranger@example.com").await;
  let kit = shop.product("Invoice Kit", 1_000, None).await;
  let theme = shop.product("Dark Theme", 500, None).await;
  let downloads = &shop.services.downloads;

  let order = shop.awaiting_confirmation(buyer, &kit).await;
  let err = downloads.create_download(buyer.user_id, order.id, kit.id).await.unwrap_err();
  assert!(matches!(err, ShopError::InvalidState(ref m) if m == "order is not paid"));

  shop.services.orders.approve_payment(shop.admin(), order.id).await.unwrap();

  assert!(matches!(
    downloads.create_download(stranger.user_id, order.id, kit.id).await,
    Err(ShopError::Unauthorized(_))
  ));
  assert!(matches!(
    downloads.create_download(buyer.user_id, order.id, theme.id).await,
    Err(ShopError::Validation(ref m)) if m == "product does not match order"
  ));
  assert!(matches!(
    downloads.create_download(buyer.user_id, Uuid::new_v4(), kit.id).await,
    Err(ShopError::NotFound(_))
  ));

  let grant = downloads.create_download(buyer.user_id, order.id, kit.id).await.unwrap();
  assert_eq!(grant.download_token.len(), 64);
  assert!(grant.expires_at > Utc::now() + Duration::hours(23));

  let product = shop.services.catalog.get_product(kit.id).await.unwrap();
  assert_eq!(product.downloads_count, 1);
  let page = downloads.list_user_downloads(buyer.user_id, PageRequest::new(1, 0)).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(downloads.download_history(buyer.user_id, kit.id).await.unwrap().len(), 1);
  assert!(!downloads.can_download(stranger.user_id, kit.id).await.unwrap());
}

#[tokio::test]
async fn reviews_require_a_completed_purchase() {
  let shop = TestShop::new();
  let buyer = shop.user("buyer@example.com").await;
  let kit = shop.product("Invoice Kit", 1_000, None).await;
  let reviews = &shop.services.reviews;

  for rating in [0, 6] {
    assert!(matches!(
      reviews.create(buyer.user_id, kit.id, rating, "x".into()).await,
      Err(ShopError::Validation(_))
    ));
  }
  assert!(matches!(
    reviews.create(buyer.user_id, kit.id, 4, "x".into()).await,
    Err(ShopError::InvalidState(_))
  ));

  let order = shop.awaiting_confirmation(buyer, &kit).await;
  assert!(matches!(
    reviews.create(buyer.user_id, kit.id, 4, "x".into()).await,
    Err(ShopError::InvalidState(_))
  ));
  shop.services.orders.approve_payment(shop.admin(), order.id).await.unwrap();

  let review = reviews.create(buyer.user_id, kit.id, 4, "solid".into()).await.unwrap();
  assert!(review.is_verified_purchase);
  assert_eq!(review.order_id, order.id);
  assert_eq!(reviews.average_rating(kit.id).await.unwrap(), 4.0);

  let updated = reviews.update(buyer.user_id, review.id, 2, None).await.unwrap();
  assert_eq!(updated.comment, "solid");
  let product = shop.services.catalog.get_product(kit.id).await.unwrap();
  assert_eq!(product.rating_average, 2.0);

  let intruder = shop.user("intruder@example.com").await;
  assert!(matches!(
    reviews.delete(intruder.user_id, review.id).await,
    Err(ShopError::Unauthorized(_))
  ));
  reviews.admin_delete(shop.admin(), review.id).await.unwrap();
  assert_eq!(reviews.average_rating(kit.id).await.unwrap(), 0.0);
  assert!(reviews.user_reviews(buyer.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn notifications_belong_to_their_recipient() {
  let shop = TestShop::new();
  let alice = shop.user("alice@example.com").await;
  let bob = shop.user("bob@example.com").await;
  let notifications = &shop.services.notifications;

  let promo = notifications
    .create(alice.user_id, "promo", "Sale", "Everything half off", None)
    .await
    .unwrap();
  assert_eq!(promo.kind, NotificationKind::System);
  assert!(matches!(
    notifications.create(alice.user_id, "order", " ", "body", None).await,
    Err(ShopError::Validation(_))
  ));
  notifications
    .create(alice.user_id, "download", "Ready", "Your file is ready", Some("/downloads".into()))
    .await
    .unwrap();

  assert!(matches!(
    notifications.mark_read(bob.user_id, promo.id).await,
    Err(ShopError::Unauthorized(_))
  ));
  notifications.mark_read(alice.user_id, promo.id).await.unwrap();
  assert_eq!(notifications.unread(alice.user_id).await.unwrap().len(), 1);
  assert_eq!(notifications.mark_all_read(alice.user_id).await.unwrap(), 1);
  assert!(notifications.unread(alice.user_id).await.unwrap().is_empty());

  let page = notifications.list(alice.user_id, PageRequest::new(1, 0)).await.unwrap();
  assert_eq!(page.limit, 20);
  assert_eq!(page.total, 2);

  notifications.delete(alice.user_id, promo.id).await.unwrap();
  assert_eq!(notifications.list(alice.user_id, PageRequest::default()).await.unwrap().total, 1);
}

#[tokio::test]
async fn custom_orders_follow_their_own_lifecycle() {
  let shop = TestShop::new();
  let buyer = shop.user("buyer@example.com").await;
  let admin = shop.admin();
  let custom = &shop.services.custom_orders;

  let request = |title: &str, budget| NewCustomOrder {
    title: title.into(),
    description: "Port our billing scripts".into(),
    requirements: "Rust".into(),
    budget_cents: budget,
  };
  assert!(matches!(custom.create(buyer.user_id, request("", 100)).await, Err(ShopError::Validation(_))));
  assert!(matches!(custom.create(buyer.user_id, request("Port", -1)).await, Err(ShopError::Validation(_))));

  let created = custom.create(buyer.user_id, request("Port", 50_000)).await.unwrap();
  assert_eq!(created.status, CustomOrderStatus::Pending);
  assert_eq!(created.budget_min_cents, 50_000);
  assert_eq!(created.budget_max_cents, 50_000);

  let process = |status: &str, quote: Option<i64>, days: Option<i64>| ProcessCustomOrder {
    status: status.into(),
    admin_notes: "looks doable".into(),
    quote_amount_cents: quote,
    estimated_days: days,
  };
  assert!(matches!(
    custom.process(admin, created.id, process("shipped", None, None)).await,
    Err(ShopError::Validation(_))
  ));
  assert!(matches!(
    custom.process(admin, created.id, process("quoted", Some(-5), None)).await,
    Err(ShopError::Validation(_))
  ));
  assert!(matches!(
    custom.process(buyer, created.id, process("quoted", None, None)).await,
    Err(ShopError::Unauthorized(_))
  ));

  let quoted = custom
    .process(admin, created.id, process("quoted", Some(45_000), Some(10)))
    .await
    .unwrap();
  assert_eq!(quoted.status, CustomOrderStatus::Quoted);
  assert_eq!(quoted.quote_amount_cents, Some(45_000));
  assert!(quoted.deadline.unwrap() > Utc::now() + Duration::days(9));
  assert_eq!(quoted.admin_notes.as_deref(), Some("looks doable"));

  let unread = shop.services.notifications.unread(buyer.user_id).await.unwrap();
  assert!(unread.iter().any(|n| n.kind == NotificationKind::CustomOrder));

  let done = custom.complete(admin, created.id).await.unwrap();
  assert_eq!(done.status, CustomOrderStatus::Completed);
  assert_eq!(done.agreed_amount_cents, Some(45_000));
  assert!(matches!(custom.complete(admin, created.id).await, Err(ShopError::InvalidState(_))));
  assert!(matches!(
    custom.process(admin, created.id, process("in_progress", None, None)).await,
    Err(ShopError::InvalidState(_))
  ));
  assert!(matches!(custom.cancel(buyer.user_id, created.id).await, Err(ShopError::InvalidState(_))));

  let other = custom.create(buyer.user_id, request("Audit", 0)).await.unwrap();
  let cancelled = custom.cancel(buyer.user_id, other.id).await.unwrap();
  assert_eq!(cancelled.status, CustomOrderStatus::Cancelled);

  assert_eq!(custom.list_mine(buyer.user_id).await.unwrap().len(), 2);
  let all = custom.list_all(PageRequest::new(1, 0), Some(CustomOrderStatus::Cancelled)).await.unwrap();
  assert_eq!(all.limit, 20);
  assert_eq!(all.total, 1);
  assert!(custom.get(admin, other.id).await.is_ok());
  let stranger = shop.user("stranger@example.com").await;
  assert!(matches!(custom.get(stranger, other.id).await, Err(ShopError::Unauthorized(_))));
}

#[tokio::test]
async fn accounts_register_login_and_change_passwords() {
  let shop = TestShop::new();
  let users = &shop.services.users;

  let registered = users
    .register(RegisterRequest {
      name: "Ana".into(),
      email: " Ana@Example.com ".into(),
      password: "secret1".into(),
    })
    .await
    .unwrap();
  assert_eq!(registered.user.email, "ana@example.com");
  assert_eq!(registered.user.role, Role::User);
  let identity = users.tokens().identity(&registered.token).unwrap();
  assert_eq!(identity.user_id, registered.user.id);

  let dup = users
    .register(RegisterRequest {
      name: "Ana".into(),
      email: "ana@example.com".into(),
      password: "secret1".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(dup, ShopError::Conflict(_)));
  let short = users
    .register(RegisterRequest {
      name: "Bo".into(),
      email: "bo@example.com".into(),
      password: "12345".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(short, ShopError::Validation(_)));

  let login = |password: &str| LoginRequest {
    email: "ANA@example.com".into(),
    password: password.into(),
  };
  assert!(users.login(login("secret1")).await.is_ok());
  let err = users.login(login("wrong!!")).await.unwrap_err();
  assert!(matches!(err, ShopError::Unauthorized(ref m) if m == "invalid email or password"));

  let user_id = registered.user.id;
  assert!(matches!(
    users.change_password(user_id, "wrong!!", "another1").await,
    Err(ShopError::Unauthorized(_))
  ));
  users.change_password(user_id, "secret1", "another1").await.unwrap();
  assert!(users.login(login("another1")).await.is_ok());

  users.delete_account(user_id).await.unwrap();
  assert!(matches!(users.login(login("another1")).await, Err(ShopError::Unauthorized(_))));
}

#[tokio::test]
async fn oauth_accounts_link_by_email_and_skip_passwords() {
  let shop = TestShop::new();
  let users = &shop.services.users;
  let profile = OAuthProfile {
    provider: AuthProvider::Github,
    provider_id: "gh-42".into(),
    email: "dev@example.com".into(),
    name: "Dev".into(),
    avatar_url: Some("https://avatars.example.com/42".into()),
  };

  let first = users.oauth_login(profile.clone()).await.unwrap();
  assert!(first.user.is_verified);
  assert!(first.user.password_hash.is_none());
  let second = users.oauth_login(profile).await.unwrap();
  assert_eq!(first.user.id, second.user.id);

  let err = users
    .login(LoginRequest {
      email: "dev@example.com".into(),
      password: "whatever".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Validation(_)));
  assert!(users.change_password(first.user.id, "a", "bbbbbb").await.is_err());
}

#[tokio::test]
async fn profiles_and_admin_user_management() {
  let shop = TestShop::new();
  let users = &shop.services.users;
  let ana = shop.user("ana@example.com").await;
  shop.user("bo@example.com").await;
  let admin = shop.admin();

  let err = users
    .update_profile(
      ana.user_id,
      ProfileUpdate {
        email: Some("bo@example.com".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ShopError::Conflict(_)));
  let renamed = users
    .update_profile(
      ana.user_id,
      ProfileUpdate {
        name: Some("Ana Lopez".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(renamed.name, "Ana Lopez");

  assert!(matches!(users.list_users(ana, PageRequest::default()).await, Err(ShopError::Unauthorized(_))));
  assert_eq!(users.list_users(admin, PageRequest::default()).await.unwrap().total, 2);

  let promoted = users
    .update_user(
      admin,
      ana.user_id,
      AdminUserUpdate {
        role: Some(Role::Admin),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert!(promoted.is_admin());

  users.delete_user(admin, ana.user_id).await.unwrap();
  assert!(matches!(users.get_user(admin, ana.user_id).await, Err(ShopError::NotFound(_))));
  assert!(users.delete_user(admin, admin.user_id).await.is_err());
}

#[tokio::test]
async fn analytics_summarise_completed_orders() {
  let shop = TestShop::new();
  let admin = shop.admin();
  let buyer = shop.user("buyer@example.com").await;
  let kit = shop.product("Invoice Kit", 1_000, None).await;
  let theme = shop.product("Dark Theme", 500, None).await;

  for product in [&kit, &kit, &theme] {
    let order = shop.awaiting_confirmation(buyer, product).await;
    shop.services.orders.approve_payment(admin, order.id).await.unwrap();
  }
  shop
    .services
    .orders
    .create_order(buyer.user_id, theme.id, 1, None)
    .await
    .unwrap();

  let analytics = &shop.services.analytics;
  let dashboard = analytics.dashboard().await.unwrap();
  assert_eq!(dashboard.total_users, 1);
  assert_eq!(dashboard.total_products, 2);
  assert_eq!(dashboard.total_orders, 4);
  assert_eq!(dashboard.total_revenue_cents, 2_500);
  assert_eq!(dashboard.orders_by_status.get(OrderStatus::Completed.as_str()), Some(&3));
  assert_eq!(dashboard.orders_last_7_days, 4);

  let today = Utc::now().date_naive();
  let revenue = analytics.revenue(today - Duration::days(1), today).await.unwrap();
  assert_eq!(revenue.completed_orders, 3);
  assert_eq!(revenue.average_order_value_cents, 833);

  let top = analytics.top_products(0).await.unwrap();
  assert_eq!(top[0].product_id, kit.id);
  assert_eq!(top[0].completed_orders, 2);
  assert_eq!(top[0].title, "Invoice Kit");

  let stats = analytics.order_stats().await.unwrap();
  assert_eq!(stats.conversion_rate, 75.0);
  assert_eq!(stats.orders_by_payment_status.get("paid"), Some(&3));

  let users = analytics.user_stats().await.unwrap();
  assert_eq!(users.users_by_role.get("user"), Some(&1));
  assert_eq!(users.new_users_last_30_days, 1);
}

#[tokio::test]
async fn access_log_drops_instead_of_blocking() {
  setup_tracing();
  let store = Arc::new(storefront::store::MemoryStore::new());
  let (queue, writer) = AccessLogQueue::spawn(store.clone(), 2);

  let entry = |path: &str| ApiLog {
    id: Uuid::new_v4(),
    user_id: None,
    method: "GET".into(),
    endpoint: path.into(),
    status_code: 200,
    response_time_ms: 3,
    ip_address: Some("127.0.0.1".into()),
    user_agent: None,
    error_message: None,
    created_at: Utc::now(),
  };

  assert!(queue.record(entry("/a")));
  assert!(queue.record(entry("/b")));
  assert!(!queue.record(entry("/c")));
  assert_eq!(queue.dropped(), 1);

  drop(queue);
  writer.await.unwrap();
  let logged: Vec<String> = store.api_logs().into_iter().map(|l| l.endpoint).collect();
  assert_eq!(logged, vec!["/a", "/b"]);
}
