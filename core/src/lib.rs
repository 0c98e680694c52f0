// src/lib.rs

//! Storefront: the domain core of a digital-goods shop.
//!
//! The crate holds everything below the HTTP layer:
//!  - Persistent models and the store traits they are read and written through,
//!    with an in-memory and a Postgres implementation.
//!  - The order/payment state machine, run as named-step pipelines on a small
//!    async pipeline runner.
//!  - Services for the catalog, carts, wishlists, downloads, reviews,
//!    notifications, custom orders, accounts and admin analytics.
//!  - Upload storage, password hashing, bearer tokens and a non-blocking
//!    access-log queue.

pub mod access_log;
pub mod auth;
pub mod error;
pub mod files;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod slug;
pub mod store;
pub mod workflows;

pub use crate::auth::{Identity, TokenIssuer};
pub use crate::error::{ShopError, ShopResult};
pub use crate::files::{FileStore, LocalFileStore, MemoryFileStore, UploadedFile};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult};
pub use crate::services::Services;
pub use crate::store::{MemoryStore, PgStore, Store};
