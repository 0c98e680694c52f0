// tests/pipeline_runner_tests.rs
mod common;

use common::setup_tracing;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront::pipeline::{ContextData, Handler, Pipeline, PipelineControl, PipelineError, PipelineResult};

#[derive(Clone, Debug, Default)]
struct Trace {
  steps_executed: Vec<String>,
  stop_at: Option<String>,
  skip_audit: bool,
}

#[derive(Debug, thiserror::Error)]
enum TestError {
  #[error("pipeline error: {0}")]
  Pipeline(#[from] PipelineError),
  #[error("handler failed: {0}")]
  Handler(String),
}

fn recorder(label: &'static str) -> Handler<Trace, TestError> {
  Box::new(move |ctx: ContextData<Trace>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

fn failing(label: &'static str) -> Handler<Trace, TestError> {
  Box::new(move |ctx: ContextData<Trace>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(label.to_string());
      Err(TestError::Handler(format!("{} exploded", label)))
    })
  })
}

fn executed(ctx: &ContextData<Trace>) -> Vec<String> {
  ctx.read().steps_executed.clone()
}

#[tokio::test]
async fn runs_steps_and_phases_in_order() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("ordering", &[("one", false), ("two", false)]);
  p.after("one", recorder("one:after")).unwrap();
  p.on("one", recorder("one:on")).unwrap();
  p.before("one", recorder("one:before")).unwrap();
  p.on("two", recorder("two:on")).unwrap();
  p.on("two", recorder("two:on:second")).unwrap();

  let ctx = ContextData::new(Trace::default());
  let result = p.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(
    executed(&ctx),
    vec!["one:before", "one:on", "one:after", "two:on", "two:on:second"]
  );
}

#[tokio::test]
async fn stop_ends_the_run_early() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("stopping", &[("a", false), ("b", false), ("c", false)]);
  p.on("a", recorder("a")).unwrap();
  p.on("b", recorder("b")).unwrap();
  p.after("b", recorder("b:after")).unwrap();
  p.on("c", recorder("c")).unwrap();

  let ctx = ContextData::new(Trace {
    stop_at: Some("b".into()),
    ..Default::default()
  });
  let result = p.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(executed(&ctx), vec!["a", "b"]);
}

#[tokio::test]
async fn required_step_failure_aborts() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("abort", &[("a", false), ("b", false)]);
  p.on("a", failing("a")).unwrap();
  p.on("b", recorder("b")).unwrap();

  let ctx = ContextData::new(Trace::default());
  let err = p.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, TestError::Handler(ref m) if m == "a exploded"));
  assert_eq!(executed(&ctx), vec!["a"]);
}

#[tokio::test]
async fn optional_step_failure_is_swallowed() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("best_effort", &[("a", false), ("notify", true), ("c", false)]);
  p.on("a", recorder("a")).unwrap();
  p.on("notify", failing("notify")).unwrap();
  p.on("c", recorder("c")).unwrap();

  let ctx = ContextData::new(Trace::default());
  let result = p.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(executed(&ctx), vec!["a", "notify", "c"]);
}

#[tokio::test]
async fn set_optional_changes_how_failures_are_handled() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("toggled", &[("audit", false), ("done", false)]);
  p.on("audit", failing("audit")).unwrap();
  p.on("done", recorder("done")).unwrap();

  p.set_optional("audit", true).unwrap();
  let ctx = ContextData::new(Trace::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(executed(&ctx), vec!["audit", "done"]);

  p.set_optional("audit", false).unwrap();
  let ctx = ContextData::new(Trace::default());
  let err = p.run(ctx.clone()).await.unwrap_err();
  assert!(matches!(err, TestError::Handler(ref m) if m == "audit exploded"));
  assert_eq!(executed(&ctx), vec!["audit"]);

  assert!(matches!(
    p.set_optional("nope", true).err(),
    Some(PipelineError::StepNotFound { .. })
  ));
}

#[tokio::test]
async fn missing_handlers_fail_only_for_required_steps() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("gaps", &[("optional", true), ("required", false)]);
  let ctx = ContextData::new(Trace::default());

  let err = p.run(ctx.clone()).await.unwrap_err();
  assert!(matches!(
    err,
    TestError::Pipeline(PipelineError::HandlerMissing { ref step_name }) if step_name == "required"
  ));

  p.on("required", recorder("required")).unwrap();
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(executed(&ctx), vec!["required"]);
}

#[tokio::test]
async fn registering_on_unknown_steps_is_an_error() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("unknown", &[("a", false)]);

  let err = p.on("nope", recorder("nope")).err().unwrap();
  assert!(matches!(err, PipelineError::StepNotFound { ref step_name } if step_name == "nope"));
  assert!(p.skip_if("nope", |_| true).is_err());
  assert!(matches!(
    p.push_step("a", false).err(),
    Some(PipelineError::DuplicateStep { .. })
  ));

  p.push_step("b", true).unwrap();
  assert_eq!(p.step_names(), vec!["a", "b"]);
}

#[tokio::test]
async fn skip_conditions_read_the_context() {
  setup_tracing();
  let audit_runs = Arc::new(AtomicUsize::new(0));
  let mut p = Pipeline::<Trace, TestError>::new("skipping", &[("work", false), ("audit", false)]);
  p.on("work", |ctx: ContextData<Trace>| async move {
    ctx.update(|t| {
      t.steps_executed.push("work".into());
      t.skip_audit = true;
    });
    Ok::<_, TestError>(PipelineControl::Continue)
  })
  .unwrap();
  let counter = audit_runs.clone();
  p.on("audit", move |_ctx: ContextData<Trace>| {
    let counter = counter.clone();
    async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok::<_, TestError>(PipelineControl::Continue)
    }
  })
  .unwrap();
  p.skip_if("audit", |t| t.skip_audit).unwrap();

  let result = p.run(ContextData::new(Trace::default())).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(audit_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handler_errors_convert_into_the_pipeline_error_type() {
  setup_tracing();
  let mut p = Pipeline::<Trace, TestError>::new("conversion", &[("a", false)]);
  p.on("a", |_ctx: ContextData<Trace>| async move {
    Err::<PipelineControl, PipelineError>(PipelineError::Halted {
      pipeline: "inner".into(),
    })
  })
  .unwrap();

  let err = p.run(ContextData::new(Trace::default())).await.unwrap_err();
  assert!(matches!(err, TestError::Pipeline(PipelineError::Halted { .. })));
}
