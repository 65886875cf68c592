//! Core data types: job input, schedule output.

use chrono::NaiveDate;

/// Raw description of a job: declared tasks, prerequisites and durations.
///
/// The three parts are kept separate so inconsistent input (a duration for
/// an undeclared task, a declared task without one) can be represented and
/// reported by validation instead of being ruled out by construction.
///
/// Ordering matters only for determinism: task order breaks ties between
/// ready tasks, and dependency order fixes adjacency order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobDefinition {
    /// Declared task identifiers.
    pub tasks: Vec<String>,
    /// `(task, prerequisites)` entries; a task may appear more than once.
    pub dependencies: Vec<(String, Vec<String>)>,
    /// `(task, duration)` entries; a later entry replaces an earlier one.
    pub durations: Vec<(String, f64)>,
}

impl JobDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the three parts in one go.
    pub fn from_parts<T, D, K, P, C>(tasks: T, dependencies: D, durations: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        D: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator<Item = (K, f64)>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            dependencies: dependencies
                .into_iter()
                .map(|(task, prereqs)| {
                    (task.into(), prereqs.into_iter().map(Into::into).collect())
                })
                .collect(),
            durations: durations
                .into_iter()
                .map(|(task, duration)| (task.into(), duration))
                .collect(),
        }
    }

    /// Declare a task together with its duration.
    pub fn task(mut self, id: impl Into<String>, duration: f64) -> Self {
        let id = id.into();
        self.durations.push((id.clone(), duration));
        self.tasks.push(id);
        self
    }

    /// Declare a task without giving it a duration.
    pub fn declare(mut self, id: impl Into<String>) -> Self {
        self.tasks.push(id.into());
        self
    }

    /// Set (or override) the duration of a task.
    pub fn duration(mut self, id: impl Into<String>, duration: f64) -> Self {
        self.durations.push((id.into(), duration));
        self
    }

    /// Record that `task` cannot start before every task in `prerequisites`
    /// has finished.
    pub fn depends_on<I>(mut self, task: impl Into<String>, prerequisites: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.dependencies.push((
            task.into(),
            prerequisites.into_iter().map(Into::into).collect(),
        ));
        self
    }
}

/// Result of the earliest-finish traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleResult {
    /// Earliest time at which every task has finished (0 for an empty job).
    pub min_completion_time: f64,
    /// Tasks in a dependency-respecting execution order.
    pub task_order: Vec<String>,
}

/// A task placed on the calendar.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask {
    pub task_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: f64,
    pub critical: bool,
}
