// apps/storefront_app/src/web/routes.rs

use actix_web::web;

use super::handlers::{
  admin_handlers, auth_handlers, cart_handlers, catalog_handlers, custom_order_handlers, download_handlers,
  notification_handlers, order_handlers, review_handlers, user_handlers, wishlist_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Literal segments are registered ahead of `{id}` routes in each scope so
// they are never captured as a path parameter.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register))
          .route("/login", web::post().to(auth_handlers::login)),
      )
      .service(
        web::scope("/user")
          .route("/profile", web::get().to(user_handlers::get_profile))
          .route("/profile", web::put().to(user_handlers::update_profile))
          .route("/password", web::put().to(user_handlers::change_password))
          .route("/account", web::delete().to(user_handlers::delete_account)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(catalog_handlers::list_categories))
          .route("/slug/{slug}", web::get().to(catalog_handlers::get_category_by_slug))
          .route("/{id}", web::get().to(catalog_handlers::get_category))
          .route("/{id}/products", web::get().to(catalog_handlers::category_products)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(catalog_handlers::list_products))
          .route("/featured", web::get().to(catalog_handlers::featured_products))
          .route("/slug/{slug}", web::get().to(catalog_handlers::get_product_by_slug))
          .route("/{id}", web::get().to(catalog_handlers::get_product))
          .route("/{id}/reviews", web::get().to(review_handlers::product_reviews)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart))
          .route("", web::post().to(cart_handlers::add_to_cart))
          .route("", web::delete().to(cart_handlers::clear_cart))
          .route("/{item_id}", web::put().to(cart_handlers::update_cart_item))
          .route("/{item_id}", web::delete().to(cart_handlers::remove_cart_item)),
      )
      .service(
        web::scope("/wishlist")
          .route("", web::get().to(wishlist_handlers::list_wishlist))
          .route("", web::post().to(wishlist_handlers::add_to_wishlist))
          .route("", web::delete().to(wishlist_handlers::clear_wishlist))
          .route("/check/{product_id}", web::get().to(wishlist_handlers::wishlist_contains))
          .route("/{item_id}", web::delete().to(wishlist_handlers::remove_from_wishlist)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order))
          .route("", web::get().to(order_handlers::list_orders))
          .route("/number/{order_number}", web::get().to(order_handlers::get_order_by_number))
          .route("/{id}", web::get().to(order_handlers::get_order))
          .route("/{id}/payment-proof", web::post().to(order_handlers::upload_payment_proof))
          .route("/{id}/cancel", web::post().to(order_handlers::cancel_order))
          .route("/{id}/transaction", web::get().to(order_handlers::get_order_transaction)),
      )
      .service(
        web::scope("/downloads")
          .route("", web::get().to(download_handlers::list_downloads))
          .route("", web::post().to(download_handlers::create_download))
          .route("/check/{product_id}", web::get().to(download_handlers::can_download))
          .route("/history/{product_id}", web::get().to(download_handlers::download_history)),
      )
      .service(
        web::scope("/reviews")
          .route("", web::post().to(review_handlers::create_review))
          .route("/mine", web::get().to(review_handlers::my_reviews))
          .route("/{id}", web::put().to(review_handlers::update_review))
          .route("/{id}", web::delete().to(review_handlers::delete_review)),
      )
      .service(
        web::scope("/notifications")
          .route("", web::get().to(notification_handlers::list_notifications))
          .route("/unread", web::get().to(notification_handlers::unread_notifications))
          .route("/read-all", web::put().to(notification_handlers::mark_all_read))
          .route("/{id}/read", web::put().to(notification_handlers::mark_read))
          .route("/{id}", web::delete().to(notification_handlers::delete_notification)),
      )
      .service(
        web::scope("/custom-orders")
          .route("", web::post().to(custom_order_handlers::create_custom_order))
          .route("", web::get().to(custom_order_handlers::my_custom_orders))
          .route("/{id}", web::get().to(custom_order_handlers::get_custom_order))
          .route("/{id}/cancel", web::post().to(custom_order_handlers::cancel_custom_order)),
      )
      .service(web::scope("/admin").configure(configure_admin_routes)),
  );
}

fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/categories", web::post().to(catalog_handlers::create_category))
    .route("/categories/{id}", web::put().to(catalog_handlers::update_category))
    .route("/categories/{id}", web::delete().to(catalog_handlers::delete_category))
    .route("/products", web::post().to(catalog_handlers::create_product))
    .route("/products/{id}", web::put().to(catalog_handlers::update_product))
    .route("/products/{id}", web::delete().to(catalog_handlers::delete_product))
    .route("/products/{id}/image", web::post().to(catalog_handlers::upload_product_image))
    .route("/orders", web::get().to(admin_handlers::list_orders))
    .route("/orders/{id}/approve", web::post().to(admin_handlers::approve_payment))
    .route("/orders/{id}/reject", web::post().to(admin_handlers::reject_payment))
    .route("/orders/{id}/refund", web::post().to(admin_handlers::refund_order))
    .route("/transactions/pending", web::get().to(admin_handlers::pending_transactions))
    .route("/custom-orders", web::get().to(admin_handlers::list_custom_orders))
    .route("/custom-orders/{id}/process", web::put().to(admin_handlers::process_custom_order))
    .route("/custom-orders/{id}/complete", web::post().to(admin_handlers::complete_custom_order))
    .route("/users", web::get().to(admin_handlers::list_users))
    .route("/users/{id}", web::get().to(admin_handlers::get_user))
    .route("/users/{id}", web::put().to(admin_handlers::update_user))
    .route("/users/{id}", web::delete().to(admin_handlers::delete_user))
    .route("/reviews/{id}", web::delete().to(admin_handlers::delete_review))
    .route("/analytics/dashboard", web::get().to(admin_handlers::dashboard))
    .route("/analytics/revenue", web::get().to(admin_handlers::revenue))
    .route("/analytics/top-products", web::get().to(admin_handlers::top_products))
    .route("/analytics/users", web::get().to(admin_handlers::user_stats))
    .route("/analytics/orders", web::get().to(admin_handlers::order_stats));
}
