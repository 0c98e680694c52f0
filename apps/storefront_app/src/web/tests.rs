// apps/storefront_app/src/web/tests.rs

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use storefront::access_log::AccessLogQueue;
use storefront::models::Role;
use storefront::{MemoryFileStore, MemoryStore, Services, TokenIssuer};

use super::configure_app_routes;
use crate::config::AppConfig;
use crate::state::AppState;

fn test_state() -> AppState {
  let config = AppConfig::from_lookup(|name| match name {
    "DATABASE_URL" => Some("postgres://unused".to_string()),
    "JWT_SECRET" => Some("test-secret".to_string()),
    _ => None,
  })
  .unwrap();
  let store = Arc::new(MemoryStore::new());
  let tokens = TokenIssuer::new(&config.jwt_secret, Duration::hours(1));
  let services = Services::new(
    store.clone(),
    Arc::new(MemoryFileStore::default()),
    tokens.clone(),
    Duration::hours(24),
  )
  .unwrap();
  let (access_log, _writer) = AccessLogQueue::spawn(store, 16);
  AppState {
    services,
    tokens,
    access_log,
    config: Arc::new(config),
  }
}

fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

async fn register(state: &AppState, email: &str) -> (String, String) {
  let auth = state
    .services
    .users
    .register(storefront::services::RegisterRequest {
      name: "Test User".into(),
      email: email.into(),
      password: "hunter22".into(),
    })
    .await
    .unwrap();
  (auth.token, auth.user.id.to_string())
}

async fn admin_token(state: &AppState) -> String {
  let (_, id) = register(state, "admin@example.com").await;
  let mut admin = state.services.users.profile(id.parse().unwrap()).await.unwrap();
  admin.role = Role::Admin;
  state.tokens.issue(&admin).unwrap()
}

#[actix_web::test]
async fn health_check_is_public() {
  let app = test::init_service(App::new().app_data(web::Data::new(test_state())).configure(configure_app_routes)).await;
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn protected_routes_require_a_valid_token() {
  let state = test_state();
  let (user_token, _) = register(&state, "buyer@example.com").await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header(bearer("not-a-jwt"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/orders")
    .insert_header(bearer(&user_token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "error": "admin access required" }));
}

#[actix_web::test]
async fn domain_errors_are_reported_with_their_message() {
  let state = test_state();
  let (token, _) = register(&state, "buyer@example.com").await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(bearer(&token))
    .set_json(json!({ "product_id": uuid::Uuid::new_v4(), "quantity": 0 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "quantity must be greater than 0");

  let req = test::TestRequest::post()
    .uri("/api/v1/auth/login")
    .set_json(json!({ "email": "buyer@example.com", "password": "wrong-password" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "invalid email or password");
}

#[actix_web::test]
async fn purchase_flow_over_http() {
  let state = test_state();
  let (buyer, _) = register(&state, "buyer@example.com").await;
  let admin = admin_token(&state).await;
  let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_app_routes)).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/categories")
    .insert_header(bearer(&admin))
    .set_json(json!({ "name": "Templates" }))
    .to_request();
  let category: Value = test::call_and_read_body_json(&app, req).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(bearer(&admin))
    .set_json(json!({
      "title": "Landing Page Kit",
      "category_id": category["id"],
      "product_type": "template",
      "price_cents": 5000,
      "discount_price_cents": 4000
    }))
    .to_request();
  let product: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(product["slug"], "landing-page-kit");

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(bearer(&buyer))
    .set_json(json!({ "product_id": product["id"], "quantity": 2 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  let order_id = created["order"]["id"].as_str().unwrap().to_string();
  assert_eq!(created["order"]["final_amount_cents"], 8000);
  assert_eq!(created["order"]["status"], "pending");

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/payment-proof", order_id))
    .insert_header(bearer(&buyer))
    .insert_header((header::CONTENT_TYPE, "image/png"))
    .set_payload(vec![0x89u8, b'P', b'N', b'G', 1, 2, 3])
    .to_request();
  let uploaded: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(uploaded["order"]["status"], "processing");

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/orders/{}/approve", order_id))
    .insert_header(bearer(&admin))
    .to_request();
  let approved: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(approved["order"]["status"], "completed");
  assert_eq!(approved["order"]["payment_status"], "paid");

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/downloads/check/{}", product["id"].as_str().unwrap()))
    .insert_header(bearer(&buyer))
    .to_request();
  let check: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(check["can_download"], true);

  // A second approval hits the state guard.
  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/admin/orders/{}/approve", order_id))
    .insert_header(bearer(&admin))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "order is not waiting for confirmation");
}
