//! Minimum completion time of a job made of dependent tasks.
//!
//! Tasks run with unlimited parallelism, constrained only by their
//! prerequisites. A [`ScheduleGraph`] is built once from a [`JobDefinition`]
//! and can then be queried for the makespan and a valid execution order
//! ([`ScheduleGraph::min_completion_time`]), for per-task slack and the
//! critical path ([`ScheduleGraph::analyze`]), or for the tasks stuck behind
//! a cycle ([`ScheduleGraph::blocked_tasks`]).
//!
//! ```
//! use job_makespan::{schedule, GraphConfig, JobDefinition};
//!
//! let job = JobDefinition::new()
//!     .task("fetch", 2.0)
//!     .task("compile", 5.0)
//!     .depends_on("compile", ["fetch"]);
//! let result = schedule(&job, &GraphConfig::strict()).unwrap();
//! assert_eq!(result.min_completion_time, 7.0);
//! assert_eq!(result.task_order, ["fetch", "compile"]);
//! ```

// Allow clippy warning triggered by PyO3 macro expansion
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod analysis;
mod calendar;
mod config;
mod graph;
mod interner;
pub mod logging;
mod models;
#[cfg(feature = "python")]
mod python;
pub mod validation;

pub use analysis::{ScheduleAnalysis, TaskTiming};
pub use config::GraphConfig;
pub use graph::{CycleError, ScheduleError, ScheduleGraph};
pub use models::{JobDefinition, ScheduleResult, ScheduledTask};
pub use validation::{ValidationError, ValidationKind};

/// Build a graph and compute its minimum completion time in one step.
///
/// # Returns
/// * `Ok(ScheduleResult)` with the makespan and a valid task order
/// * `Err(ScheduleError::Validation)` if an enabled validation rejects the job
/// * `Err(ScheduleError::Cycle)` if the dependencies contain a cycle
pub fn schedule(
    job: &JobDefinition,
    config: &GraphConfig,
) -> Result<ScheduleResult, ScheduleError> {
    let graph = ScheduleGraph::new(job, config)?;
    Ok(graph.min_completion_time()?)
}
