// core/src/models/mod.rs

//! Persistent entities and the request/response shapes built around them.

pub mod analytics;
pub mod api_log;
pub mod cart;
pub mod category;
pub mod custom_order;
pub mod download;
pub mod notification;
pub mod order;
pub mod pagination;
pub mod product;
pub mod review;
pub mod transaction;
pub mod user;
pub mod wishlist;

pub use analytics::{DashboardStats, OrderStats, RevenueStats, TopProduct, UserStats};
pub use api_log::ApiLog;
pub use cart::{CartItem, CartLine, CartView};
pub use category::{Category, CategoryRequest};
pub use custom_order::{CustomOrder, CustomOrderStatus, NewCustomOrder, ProcessCustomOrder};
pub use download::Download;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use order::{Order, OrderAmounts, OrderStatus, OrderType, PaymentStatus};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use product::{NewProduct, Product, ProductFilter, ProductType, ProductUpdate};
pub use review::Review;
pub use transaction::{PaymentAudit, Transaction, TransactionStatus};
pub use user::{AuthProvider, Role, User};
pub use wishlist::WishlistItem;
