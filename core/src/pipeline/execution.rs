// core/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their handlers.

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::{Phase, Pipeline};
use super::error::PipelineError;
use tracing::{event, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// A failing handler in a required step aborts the run and its error is
  /// returned. A failing handler in an optional step is logged at `WARN` and
  /// the run continues with the next step.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let run_span = tracing::info_span!("pipeline_run", pipeline = %self.name, num_steps = self.steps.len());
    self.run_steps(ctx_data).instrument(run_span).await
  }

  async fn run_steps(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = tracing::info_span!(
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if step_def.should_skip(&ctx_data) {
        step_span.in_scope(|| event!(Level::DEBUG, "Step skipped by condition."));
        continue;
      }

      let has_handlers = Phase::ALL
        .iter()
        .any(|phase| !self.handlers_for(step_name, *phase).is_empty());
      if !has_handlers {
        if step_def.optional {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        step_span.in_scope(|| event!(Level::ERROR, "Required step has no handlers."));
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let outcome = self
        .run_step(step_name, &ctx_data)
        .instrument(step_span.clone())
        .await;

      match outcome {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          step_span.in_scope(|| event!(Level::INFO, "Pipeline stopped by handler."));
          return Ok(PipelineResult::Stopped);
        }
        Err(e) if step_def.optional => {
          step_span.in_scope(|| event!(Level::WARN, error = %e, "Optional step failed, continuing."));
        }
        Err(e) => {
          step_span.in_scope(|| event!(Level::ERROR, error = %e, "Step failed."));
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_name: &str, ctx_data: &ContextData<TData>) -> Result<PipelineControl, Err> {
    for phase in Phase::ALL {
      for (handler_idx, handler_fn) in self.handlers_for(step_name, phase).iter().enumerate() {
        let handler_span = tracing::debug_span!("handler", phase = phase.label(), handler_index = handler_idx);
        if handler_fn(ctx_data.clone()).instrument(handler_span).await? == PipelineControl::Stop {
          return Ok(PipelineControl::Stop);
        }
      }
    }
    Ok(PipelineControl::Continue)
  }
}
