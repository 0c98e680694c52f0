// core/src/pipeline/error.rs

use thiserror::Error;

/// Failures raised by the runner itself rather than by step handlers.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Step already defined: {step_name}")]
  DuplicateStep { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Pipeline '{pipeline}' was stopped before completing")]
  Halted { pipeline: String },
}
