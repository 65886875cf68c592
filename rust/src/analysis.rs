//! Critical path analysis: latest times and slack from a backward pass.

use rustc_hash::FxHashMap;

use crate::graph::{CycleError, ScheduleGraph};
use crate::interner::TaskIdx;
use crate::log_summary;
use crate::models::ScheduleResult;

const EPSILON: f64 = 1e-9;

/// Per-task timing from the forward and backward passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskTiming {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: f64,
    /// Latest start that does not delay the job (from backward pass).
    pub latest_start: f64,
    /// Latest finish that does not delay the job (from backward pass).
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack.abs() < EPSILON
    }
}

/// Makespan, execution order, and per-task timings of an acyclic job.
#[derive(Clone, Debug, Default)]
pub struct ScheduleAnalysis {
    pub result: ScheduleResult,
    /// Timings in `result.task_order` order.
    timings: Vec<TaskTiming>,
    positions: FxHashMap<String, usize>,
    critical_path: Vec<String>,
}

impl ScheduleAnalysis {
    pub fn min_completion_time(&self) -> f64 {
        self.result.min_completion_time
    }

    pub fn timing(&self, task: &str) -> Option<&TaskTiming> {
        self.positions.get(task).map(|&pos| &self.timings[pos])
    }

    /// `(task, timing)` pairs in execution order.
    pub fn timings(&self) -> impl Iterator<Item = (&str, &TaskTiming)> {
        self.result
            .task_order
            .iter()
            .map(String::as_str)
            .zip(&self.timings)
    }

    /// Every zero-slack task, in execution order.
    pub fn critical_tasks(&self) -> Vec<&str> {
        self.timings()
            .filter(|(_, timing)| timing.is_critical())
            .map(|(task, _)| task)
            .collect()
    }

    /// One longest chain from a task that starts at 0 to a task finishing at
    /// the makespan. Where several chains tie, prerequisites are followed in
    /// insertion order.
    pub fn critical_path(&self) -> &[String] {
        &self.critical_path
    }
}

impl ScheduleGraph {
    /// Forward pass, then a backward pass over the reverse order computing
    /// latest times and slack.
    pub fn analyze(&self) -> Result<ScheduleAnalysis, CycleError> {
        let pass = self.forward_pass();
        let n = self.len();
        if pass.order.len() < n {
            return Err(CycleError);
        }

        let durations = self.durations();
        let makespan = self.makespan(&pass.earliest_start);

        // Sinks may finish as late as the makespan; everything else must
        // finish before its tightest dependent has to start.
        let mut latest_finish = vec![makespan; n];
        for &task in pass.order.iter().rev() {
            let t = task as usize;
            latest_finish[t] = self
                .dependents(task)
                .iter()
                .map(|&d| latest_finish[d as usize] - durations[d as usize])
                .reduce(f64::min)
                .unwrap_or(makespan);
        }

        let timings: Vec<TaskTiming> = pass
            .order
            .iter()
            .map(|&task| {
                let t = task as usize;
                let earliest_start = pass.earliest_start[t];
                let latest_start = latest_finish[t] - durations[t];
                TaskTiming {
                    earliest_start,
                    earliest_finish: earliest_start + durations[t],
                    latest_start,
                    latest_finish: latest_finish[t],
                    slack: latest_start - earliest_start,
                }
            })
            .collect();

        let critical_path = self.trace_critical_path(&pass.order, &timings, makespan);
        log_summary!(
            self.verbosity(),
            "critical path {:?} of length {}",
            critical_path,
            makespan
        );

        let task_order = self.names_of(&pass.order);
        let positions = task_order
            .iter()
            .enumerate()
            .map(|(pos, task)| (task.clone(), pos))
            .collect();

        Ok(ScheduleAnalysis {
            result: ScheduleResult {
                min_completion_time: makespan,
                task_order,
            },
            timings,
            positions,
            critical_path,
        })
    }

    /// Walk back from the first critical sink, always stepping to a critical
    /// prerequisite that finishes exactly when the current task starts.
    fn trace_critical_path(
        &self,
        order: &[TaskIdx],
        timings: &[TaskTiming],
        makespan: f64,
    ) -> Vec<String> {
        let mut timing_of: Vec<Option<&TaskTiming>> = vec![None; self.len()];
        for (&task, timing) in order.iter().zip(timings) {
            timing_of[task as usize] = Some(timing);
        }

        let sink = order.iter().zip(timings).find(|(_, timing)| {
            timing.is_critical() && (timing.earliest_finish - makespan).abs() < EPSILON
        });
        let Some((&sink, _)) = sink else {
            return Vec::new();
        };

        let mut chain = vec![sink];
        let mut current = sink;
        while let Some(&prev) = self.prerequisites(current).iter().find(|&&p| {
            match (timing_of[p as usize], timing_of[current as usize]) {
                (Some(before), Some(after)) => {
                    before.is_critical()
                        && (before.earliest_finish - after.earliest_start).abs() < EPSILON
                }
                _ => false,
            }
        }) {
            chain.push(prev);
            current = prev;
        }

        chain.reverse();
        self.names_of(&chain)
    }
}
