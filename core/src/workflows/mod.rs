// core/src/workflows/mod.rs

//! The order/payment state machine, expressed as step pipelines.
//!
//! | Trigger        | Guard                           | Result                  |
//! |----------------|---------------------------------|-------------------------|
//! | checkout       | product active, quantity > 0    | (pending, pending)      |
//! | payment proof  | payment pending                 | (processing, pending)   |
//! | approve        | (processing, pending)           | (completed, paid)       |
//! | reject         | (processing, pending)           | (cancelled, failed)     |
//! | refund         | (completed, paid)               | (refunded, refunded)    |
//!
//! Cancellation is a single guarded write and lives directly on
//! [`crate::services::OrderService`].

pub mod checkout_pipeline;
pub mod common_steps;
pub mod contexts;
pub mod payment_proof_pipeline;
pub mod settlement_pipeline;

pub use checkout_pipeline::build_checkout_pipeline;
pub use contexts::{CheckoutCtxData, PaymentProofCtxData, SettlementCtxData, SettlementDecision, WorkflowDeps};
pub use payment_proof_pipeline::build_payment_proof_pipeline;
pub use settlement_pipeline::build_settlement_pipeline;
