// core/src/pipeline/mod.rs

//! A small step-pipeline runner.
//!
//! Multi-step operations (checkout, proof upload, payment settlement) are
//! declared as an ordered list of named steps. Each step gets one or more async
//! handlers that operate on a shared [`ContextData`]. Steps marked optional are
//! best-effort: their failures are logged and the run carries on.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod error;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use error::PipelineError;
pub use step::{SkipCondition, StepDef};
