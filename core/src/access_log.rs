// core/src/access_log.rs

//! Non-blocking access log.
//!
//! Request handlers push entries into a bounded channel; a single background
//! task drains it and writes through [`ApiLogStore`]. When the channel is
//! full the entry is dropped and counted, so logging never adds latency to a
//! request.

use crate::models::ApiLog;
use crate::store::ApiLogStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AccessLogQueue {
  sender: mpsc::Sender<ApiLog>,
  dropped: Arc<AtomicU64>,
}

impl AccessLogQueue {
  /// Starts the writer task. The task ends once every queue handle is
  /// dropped and the backlog is flushed.
  pub fn spawn(store: Arc<dyn ApiLogStore>, capacity: usize) -> (Self, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<ApiLog>(capacity.max(1));
    let writer = tokio::spawn(async move {
      while let Some(entry) = receiver.recv().await {
        if let Err(e) = store.insert_api_log(&entry).await {
          warn!(error = %e, endpoint = %entry.endpoint, "Failed to persist access log entry.");
        }
      }
      debug!("Access log writer stopped.");
    });
    (
      Self {
        sender,
        dropped: Arc::new(AtomicU64::new(0)),
      },
      writer,
    )
  }

  /// Enqueues `entry` without waiting. Returns `false` if it was dropped.
  pub fn record(&self, entry: ApiLog) -> bool {
    match self.sender.try_send(entry) {
      Ok(()) => true,
      Err(mpsc::error::TrySendError::Full(_)) | Err(mpsc::error::TrySendError::Closed(_)) => {
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if total.is_power_of_two() {
          warn!(dropped_total = total, "Access log queue saturated; dropping entries.");
        }
        false
      }
    }
  }

  pub fn dropped(&self) -> u64 {
    self.dropped.load(Ordering::Relaxed)
  }
}
