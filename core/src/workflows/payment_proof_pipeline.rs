// core/src/workflows/payment_proof_pipeline.rs

use super::common_steps;
use super::contexts::PaymentProofCtxData;
use crate::error::{ShopError, ShopResult};
use crate::models::{OrderStatus, PaymentStatus};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

/// Folder, relative to the file store root, that holds payment proofs.
pub const PROOF_FOLDER: &str = "payment_proofs";

pub fn build_payment_proof_pipeline() -> Result<Pipeline<PaymentProofCtxData, ShopError>, PipelineError> {
  let mut p = Pipeline::<PaymentProofCtxData, ShopError>::new(
    "payment_proof",
    &[
      ("load_order", false),
      ("store_proof", false),
      ("record_proof", false),
      ("discard_previous_proof", true),
    ],
  );

  p.on("load_order", load_order)?
    .on("store_proof", store_proof)?
    .on("record_proof", record_proof)?
    .on("discard_previous_proof", discard_previous_proof)?;

  p.skip_if("discard_previous_proof", |data| {
    data.previous_proof.is_none() || data.previous_proof == data.stored_path
  })?;

  Ok(p)
}

/// Loads the order before anything touches the file store, so a rejected
/// upload never leaves a file behind.
#[instrument(name = "payment_proof::load_order", skip_all)]
async fn load_order(ctx: ContextData<PaymentProofCtxData>) -> ShopResult<PipelineControl> {
  let (orders, user_id, order_id) = ctx.with(|d| (d.deps.orders.clone(), d.user_id, d.order_id));

  let (order, transaction) = common_steps::load_order_with_transaction(orders.as_ref(), order_id).await?;
  if !order.is_owned_by(user_id) {
    return Err(ShopError::unauthorized("unauthorized"));
  }
  if !order.can_upload_proof() {
    return Err(ShopError::invalid_state("order is not pending payment"));
  }

  ctx.update(|d| {
    d.previous_proof = transaction.audit().proof_image.clone();
    d.order = Some(order);
    d.transaction = Some(transaction);
  });
  Ok(PipelineControl::Continue)
}

#[instrument(name = "payment_proof::store_proof", skip_all)]
async fn store_proof(ctx: ContextData<PaymentProofCtxData>) -> ShopResult<PipelineControl> {
  let (files, file) = ctx.with(|d| (d.deps.files.clone(), d.file.clone()));
  let path = files.store(PROOF_FOLDER, &file).await?;
  debug!(path = %path, "Payment proof stored.");
  ctx.write().stored_path = Some(path);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "payment_proof::record_proof", skip_all)]
async fn record_proof(ctx: ContextData<PaymentProofCtxData>) -> ShopResult<PipelineControl> {
  let (deps, order, transaction, path) = {
    let guard = ctx.read();
    match (&guard.order, &guard.transaction, &guard.stored_path) {
      (Some(order), Some(transaction), Some(path)) => {
        (guard.deps.clone(), order.clone(), transaction.clone(), path.clone())
      }
      _ => return Err(ShopError::Internal("payment proof context is incomplete".to_string())),
    }
  };

  let expected_version = order.version;
  let mut order = order;
  let mut transaction = transaction;
  order.set_state(OrderStatus::Processing, PaymentStatus::Pending);
  transaction.audit_mut().proof_image = Some(path.clone());
  transaction.updated_at = Utc::now();

  match common_steps::save_guarded(deps.orders.as_ref(), &order, &transaction, expected_version).await {
    Ok(saved) => {
      info!(order_id = %saved.id, "Payment proof recorded, awaiting confirmation.");
      ctx.update(|d| {
        d.order = Some(saved);
        d.transaction = Some(transaction);
      });
      Ok(PipelineControl::Continue)
    }
    Err(e) => {
      if let Err(cleanup) = deps.files.delete(&path).await {
        warn!(path = %path, error = %cleanup, "Failed to remove orphaned payment proof.");
      }
      ctx.write().stored_path = None;
      Err(e)
    }
  }
}

#[instrument(name = "payment_proof::discard_previous_proof", skip_all)]
async fn discard_previous_proof(ctx: ContextData<PaymentProofCtxData>) -> ShopResult<PipelineControl> {
  let (files, previous) = ctx.with(|d| (d.deps.files.clone(), d.previous_proof.clone()));
  if let Some(previous) = previous {
    files.delete(&previous).await?;
    debug!(path = %previous, "Previous payment proof removed.");
  }
  Ok(PipelineControl::Continue)
}
