//! Dependency graph and earliest-finish propagation.

use std::collections::VecDeque;

use thiserror::Error;

use crate::config::GraphConfig;
use crate::interner::{TaskIdx, TaskIndex};
use crate::models::{JobDefinition, ScheduleResult};
use crate::validation::{check_durations, check_references, ValidationError};
use crate::{log_debug, log_steps, log_summary};

/// The dependency relation contains a cycle, so some tasks can never start.
///
/// Detected structurally (fewer tasks emitted than declared). Use
/// [`ScheduleGraph::blocked_tasks`] to find out which tasks are stuck.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cycle detected in task dependencies. Cannot complete all tasks.")]
pub struct CycleError;

/// Either failure a caller can hit between building a graph and reading its
/// makespan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Working state of one forward traversal.
pub(crate) struct ForwardPass {
    /// Tasks in the order they left the ready queue.
    pub order: Vec<TaskIdx>,
    /// Earliest start per task: latest finish among its prerequisites.
    pub earliest_start: Vec<f64>,
    /// Prerequisites still outstanding per task once the queue drained.
    pub remaining: Vec<u32>,
}

/// Tasks, their durations, and the prerequisite -> dependent edges between
/// them.
///
/// Built once and never mutated; every query works on its own copy of the
/// in-degree table, so a graph can be queried any number of times (and from
/// several threads).
#[derive(Debug, Clone)]
pub struct ScheduleGraph {
    index: TaskIndex,
    durations: Vec<f64>,
    /// Forward edges: `dependents[p]` lists tasks waiting on `p`.
    dependents: Vec<Vec<TaskIdx>>,
    /// Reverse edges between declared tasks.
    prerequisites: Vec<Vec<TaskIdx>>,
    /// Prerequisite count per task, including undeclared prerequisites that
    /// can never be satisfied.
    in_degree: Vec<u32>,
    verbosity: u8,
}

impl ScheduleGraph {
    /// Build the graph, running whichever validations `config` enables.
    ///
    /// Without validation, input is interpreted leniently: an undeclared
    /// prerequisite blocks its dependent forever, an undeclared dependency key
    /// is dropped, a task without a duration takes zero time, and a repeated
    /// task declaration keeps its first position.
    pub fn new(job: &JobDefinition, config: &GraphConfig) -> Result<Self, ValidationError> {
        let verbosity = config.verbosity;

        let mut index = TaskIndex::with_capacity(job.tasks.len());
        for task in &job.tasks {
            if index.declare(task).is_err() {
                log_debug!(verbosity, "task {:?} declared again, keeping first", task);
            }
        }

        if config.validate_dependencies {
            check_references(job, &index)?;
        }

        let n = index.len();
        let mut declared_durations: Vec<Option<f64>> = vec![None; n];
        for (task, duration) in &job.durations {
            if let Some(idx) = index.get(task) {
                declared_durations[idx as usize] = Some(*duration);
            }
        }

        if config.validate_durations {
            check_durations(&index, &declared_durations)?;
        }

        let mut dependents: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        let mut prerequisites: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        let mut in_degree: Vec<u32> = vec![0; n];
        let mut edges = 0usize;

        for (task, prereqs) in &job.dependencies {
            let Some(task_idx) = index.get(task) else {
                log_debug!(verbosity, "dropping edges of undeclared task {:?}", task);
                continue;
            };
            for prereq in prereqs {
                in_degree[task_idx as usize] += 1;
                match index.get(prereq) {
                    Some(prereq_idx) => {
                        dependents[prereq_idx as usize].push(task_idx);
                        prerequisites[task_idx as usize].push(prereq_idx);
                        edges += 1;
                    }
                    None => {
                        log_debug!(
                            verbosity,
                            "{:?} waits on undeclared task {:?} and can never start",
                            task,
                            prereq
                        );
                    }
                }
            }
        }

        log_summary!(verbosity, "built graph: {} tasks, {} edges", n, edges);

        Ok(Self {
            index,
            durations: declared_durations
                .into_iter()
                .map(|d| d.unwrap_or(0.0))
                .collect(),
            dependents,
            prerequisites,
            in_degree,
            verbosity,
        })
    }

    /// Kahn traversal propagating earliest start times along forward edges.
    ///
    /// Ready tasks are seeded in declaration order and handled first in,
    /// first out, which makes the emitted order deterministic.
    pub(crate) fn forward_pass(&self) -> ForwardPass {
        let n = self.len();
        let mut remaining = self.in_degree.clone();
        let mut earliest_start = vec![0.0; n];
        let mut order: Vec<TaskIdx> = Vec::with_capacity(n);

        let mut queue: VecDeque<TaskIdx> = (0..n as TaskIdx)
            .filter(|&idx| remaining[idx as usize] == 0)
            .collect();

        while let Some(task) = queue.pop_front() {
            order.push(task);
            let t = task as usize;
            let finish = earliest_start[t] + self.durations[t];
            log_steps!(
                self.verbosity,
                "{} starts at {} and finishes at {}",
                self.index.name(task),
                earliest_start[t],
                finish
            );

            for &dependent in &self.dependents[t] {
                let d = dependent as usize;
                if finish > earliest_start[d] {
                    earliest_start[d] = finish;
                }
                remaining[d] -= 1;
                log_debug!(
                    self.verbosity,
                    "{} -> {}: earliest start {}, {} prerequisites left",
                    self.index.name(task),
                    self.index.name(dependent),
                    earliest_start[d],
                    remaining[d]
                );
                if remaining[d] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        ForwardPass {
            order,
            earliest_start,
            remaining,
        }
    }

    /// Minimum time to complete the whole job and one valid execution order.
    ///
    /// An empty job completes at time 0 with an empty order.
    pub fn min_completion_time(&self) -> Result<ScheduleResult, CycleError> {
        let pass = self.forward_pass();
        if pass.order.len() < self.len() {
            return Err(CycleError);
        }

        let min_completion_time = self.makespan(&pass.earliest_start);
        log_summary!(
            self.verbosity,
            "minimum completion time {} over {} tasks",
            min_completion_time,
            self.len()
        );

        Ok(ScheduleResult {
            min_completion_time,
            task_order: self.names_of(&pass.order),
        })
    }

    /// Declared tasks that can never become ready: cycle members, tasks
    /// downstream of a cycle, and tasks waiting on undeclared prerequisites.
    ///
    /// Empty when the graph is acyclic. Returned in declaration order.
    pub fn blocked_tasks(&self) -> Vec<String> {
        let pass = self.forward_pass();
        pass.remaining
            .iter()
            .enumerate()
            .filter(|(_, &left)| left > 0)
            .map(|(idx, _)| self.index.name(idx as TaskIdx).to_string())
            .collect()
    }

    /// Latest finish over all tasks, 0 when there are none.
    pub(crate) fn makespan(&self, earliest_start: &[f64]) -> f64 {
        earliest_start
            .iter()
            .zip(&self.durations)
            .map(|(start, duration)| start + duration)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub(crate) fn names_of(&self, indices: &[TaskIdx]) -> Vec<String> {
        indices
            .iter()
            .map(|&idx| self.index.name(idx).to_string())
            .collect()
    }

    pub(crate) fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub(crate) fn dependents(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.dependents[idx as usize]
    }

    pub(crate) fn prerequisites(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.prerequisites[idx as usize]
    }

    pub(crate) fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Declared tasks in declaration order.
    pub fn tasks(&self) -> &[String] {
        self.index.names()
    }

    /// Duration used for a task (0 for a task declared without one).
    pub fn duration_of(&self, task: &str) -> Option<f64> {
        self.index.get(task).map(|idx| self.durations[idx as usize])
    }

    /// Declared prerequisites of a task, in insertion order.
    pub fn prerequisites_of(&self, task: &str) -> Option<Vec<&str>> {
        let idx = self.index.get(task)?;
        Some(
            self.prerequisites[idx as usize]
                .iter()
                .map(|&p| self.index.name(p))
                .collect(),
        )
    }

    /// Tasks that wait on `task`, in insertion order.
    pub fn dependents_of(&self, task: &str) -> Option<Vec<&str>> {
        let idx = self.index.get(task)?;
        Some(
            self.dependents[idx as usize]
                .iter()
                .map(|&d| self.index.name(d))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationKind;
    use rustc_hash::FxHashMap;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_job() -> JobDefinition {
        JobDefinition::from_parts(
            ["A", "B", "C", "D", "E", "F"],
            [("D", vec!["A"]), ("E", vec!["B", "C"]), ("F", vec!["D", "E"])],
            [
                ("A", 3.0),
                ("B", 2.0),
                ("C", 4.0),
                ("D", 5.0),
                ("E", 2.0),
                ("F", 3.0),
            ],
        )
    }

    /// Longest duration-weighted path, by memoised recursion over the raw
    /// job definition. Only valid for acyclic jobs with known prerequisites.
    fn longest_path(job: &JobDefinition) -> f64 {
        fn finish<'a>(
            task: &'a str,
            prereqs: &FxHashMap<&'a str, Vec<&'a str>>,
            durations: &FxHashMap<&'a str, f64>,
            memo: &mut FxHashMap<&'a str, f64>,
        ) -> f64 {
            if let Some(&done) = memo.get(task) {
                return done;
            }
            let start = prereqs
                .get(task)
                .map(|ps| {
                    ps.iter()
                        .map(|p| finish(*p, prereqs, durations, memo))
                        .fold(0.0, f64::max)
                })
                .unwrap_or(0.0);
            let end = start + durations[task];
            memo.insert(task, end);
            end
        }

        let mut prereqs: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for (task, ps) in &job.dependencies {
            prereqs
                .entry(task.as_str())
                .or_default()
                .extend(ps.iter().map(String::as_str));
        }
        let durations: FxHashMap<&str, f64> = job
            .durations
            .iter()
            .map(|(t, d)| (t.as_str(), *d))
            .collect();
        let mut memo = FxHashMap::default();
        job.tasks
            .iter()
            .map(|t| finish(t, &prereqs, &durations, &mut memo))
            .fold(0.0, f64::max)
    }

    fn assert_topological(job: &JobDefinition, order: &[String]) {
        let position: FxHashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();
        assert_eq!(position.len(), job.tasks.len(), "order must hold every task once");
        for (task, prereqs) in &job.dependencies {
            for prereq in prereqs {
                assert!(
                    position[prereq.as_str()] < position[task.as_str()],
                    "{prereq} must come before {task} in {order:?}"
                );
            }
        }
    }

    #[test]
    fn test_sample_job() {
        let job = sample_job();
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();
        let result = graph.min_completion_time().unwrap();

        // A -> D -> F = 3 + 5 + 3
        assert_close(result.min_completion_time, 11.0);
        assert_close(result.min_completion_time, longest_path(&job));
        assert_eq!(result.task_order, ["A", "B", "C", "D", "E", "F"]);
        assert_topological(&job, &result.task_order);
    }

    #[test]
    fn test_single_task() {
        let job = JobDefinition::new().task("solo", 7.5);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert_close(result.min_completion_time, 7.5);
        assert_eq!(result.task_order, ["solo"]);
    }

    #[test]
    fn test_empty_job_completes_at_zero() {
        let graph = ScheduleGraph::new(&JobDefinition::new(), &GraphConfig::strict()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert!(graph.is_empty());
        assert_eq!(result, ScheduleResult::default());
        assert!(graph.blocked_tasks().is_empty());
    }

    #[test]
    fn test_independent_tasks_run_in_parallel() {
        let job = JobDefinition::new().task("a", 4.0).task("b", 9.0).task("c", 1.0);
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert_close(result.min_completion_time, 9.0);
        assert_eq!(result.task_order, ["a", "b", "c"]);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let job = JobDefinition::new()
            .task("z", 1.0)
            .task("y", 1.0)
            .task("x", 1.0)
            .task("w", 1.0)
            .depends_on("w", ["x"])
            .depends_on("x", ["z"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();
        let result = graph.min_completion_time().unwrap();

        // seeded z, y; x freed by z; w freed by x
        assert_eq!(result.task_order, ["z", "y", "x", "w"]);
        assert_close(result.min_completion_time, 3.0);
    }

    #[test]
    fn test_diamond_takes_longer_branch() {
        let job = JobDefinition::new()
            .task("a", 2.0)
            .task("b", 3.0)
            .task("c", 5.0)
            .task("d", 4.0)
            .depends_on("b", ["a"])
            .depends_on("c", ["a"])
            .depends_on("d", ["b", "c"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert_close(result.min_completion_time, 11.0);
        assert_topological(&job, &result.task_order);
    }

    #[test]
    fn test_repeated_queries_agree() {
        let job = sample_job();
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();

        let first = graph.min_completion_time().unwrap();
        let second = graph.min_completion_time().unwrap();
        let fresh = ScheduleGraph::new(&job, &GraphConfig::default())
            .unwrap()
            .min_completion_time()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_two_task_cycle() {
        let job = JobDefinition::new()
            .task("A", 1.0)
            .task("B", 1.0)
            .depends_on("A", ["B"])
            .depends_on("B", ["A"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();

        assert_eq!(graph.min_completion_time(), Err(CycleError));
        assert_eq!(graph.blocked_tasks(), ["A", "B"]);
        // still a cycle the second time around
        assert_eq!(graph.min_completion_time(), Err(CycleError));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let job = JobDefinition::new().task("a", 1.0).depends_on("a", ["a"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();

        assert_eq!(graph.min_completion_time(), Err(CycleError));
    }

    #[test]
    fn test_blocked_tasks_include_downstream_of_cycle() {
        let job = JobDefinition::new()
            .task("root", 1.0)
            .task("p", 1.0)
            .task("q", 1.0)
            .task("after", 1.0)
            .depends_on("p", ["root", "q"])
            .depends_on("q", ["p"])
            .depends_on("after", ["q"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();

        assert_eq!(graph.min_completion_time(), Err(CycleError));
        assert_eq!(graph.blocked_tasks(), ["p", "q", "after"]);
    }

    #[test]
    fn test_unknown_prerequisite_rejected_when_validating() {
        let job = JobDefinition::new().task("a", 1.0).depends_on("a", ["ghost"]);
        let config = GraphConfig {
            validate_dependencies: true,
            ..GraphConfig::default()
        };

        let err = ScheduleGraph::new(&job, &config).unwrap_err();
        assert_eq!(err.kind, ValidationKind::UnknownTask);
        assert_eq!(err.task_ids, ["ghost"]);
    }

    #[test]
    fn test_unknown_prerequisite_blocks_when_not_validating() {
        let job = JobDefinition::new()
            .task("a", 1.0)
            .task("b", 1.0)
            .depends_on("a", ["ghost"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();

        assert_eq!(graph.min_completion_time(), Err(CycleError));
        assert_eq!(graph.blocked_tasks(), ["a"]);
        assert_eq!(graph.prerequisites_of("a"), Some(vec![]));
    }

    #[test]
    fn test_undeclared_dependent_is_dropped_when_not_validating() {
        let job = JobDefinition::new()
            .task("a", 2.0)
            .depends_on("ghost", ["a"])
            .duration("ghost", 100.0);
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert_close(result.min_completion_time, 2.0);
        assert_eq!(result.task_order, ["a"]);
        assert_eq!(graph.dependents_of("a"), Some(vec![]));
        assert_eq!(graph.duration_of("ghost"), None);
    }

    #[test]
    fn test_missing_duration_rejected_when_validating() {
        let job = JobDefinition::new().task("a", 1.0).declare("b").declare("c");
        let config = GraphConfig {
            validate_durations: true,
            ..GraphConfig::default()
        };

        let err = ScheduleGraph::new(&job, &config).unwrap_err();
        assert_eq!(err.kind, ValidationKind::MissingDuration);
        assert_eq!(err.task_ids, ["b", "c"]);
    }

    #[test]
    fn test_missing_duration_counts_as_zero_when_not_validating() {
        let job = JobDefinition::new()
            .task("a", 4.0)
            .declare("b")
            .depends_on("b", ["a"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();

        assert_eq!(graph.duration_of("b"), Some(0.0));
        assert_close(graph.min_completion_time().unwrap().min_completion_time, 4.0);
    }

    #[test]
    fn test_later_duration_entry_wins() {
        let job = JobDefinition::new().task("a", 1.0).duration("a", 6.0);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();

        assert_eq!(graph.duration_of("a"), Some(6.0));
    }

    #[test]
    fn test_duplicate_declaration_collapses_without_validation() {
        let job = JobDefinition::new().task("a", 1.0).task("b", 2.0).declare("a");
        let graph = ScheduleGraph::new(&job, &GraphConfig::default()).unwrap();

        assert_eq!(graph.tasks(), ["a", "b"]);
        assert_eq!(graph.min_completion_time().unwrap().task_order, ["a", "b"]);

        let err = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap_err();
        assert_eq!(err.kind, ValidationKind::DuplicateTask);
    }

    #[test]
    fn test_repeated_edge_is_consumed_twice() {
        let job = JobDefinition::new()
            .task("a", 2.0)
            .task("b", 3.0)
            .depends_on("b", ["a", "a"]);
        let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();
        let result = graph.min_completion_time().unwrap();

        assert_close(result.min_completion_time, 5.0);
        assert_eq!(result.task_order, ["a", "b"]);
    }

    #[test]
    fn test_accessors() {
        let graph = ScheduleGraph::new(&sample_job(), &GraphConfig::default()).unwrap();

        assert_eq!(graph.len(), 6);
        assert_eq!(graph.prerequisites_of("E"), Some(vec!["B", "C"]));
        assert_eq!(graph.dependents_of("E"), Some(vec!["F"]));
        assert_eq!(graph.duration_of("C"), Some(4.0));
        assert_eq!(graph.prerequisites_of("nope"), None);
    }

    #[test]
    fn test_schedule_error_wraps_both_failures() {
        let validation = ValidationError::new(ValidationKind::MissingDuration, vec!["x".into()]);
        let wrapped: ScheduleError = validation.clone().into();
        assert_eq!(wrapped.to_string(), validation.to_string());

        let wrapped: ScheduleError = CycleError.into();
        assert_eq!(wrapped, ScheduleError::Cycle(CycleError));
    }

    #[test]
    fn test_graph_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScheduleGraph>();
    }

    #[test]
    fn test_every_four_task_dag_matches_longest_path() {
        let names = ["t0", "t1", "t2", "t3"];
        let pairs: Vec<(usize, usize)> = (0..4)
            .flat_map(|i| (i + 1..4).map(move |j| (i, j)))
            .collect();
        let duration_sets = [[3.0, 1.0, 4.0, 2.0], [0.5, 0.0, 2.25, 7.0]];

        for durations in duration_sets {
            for mask in 0u32..(1 << pairs.len()) {
                let mut job = JobDefinition::new();
                // declare in reverse so the order must be derived, not copied
                for (name, duration) in names.iter().zip(durations).rev() {
                    job = job.task(*name, duration);
                }
                for (bit, &(from, to)) in pairs.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        job = job.depends_on(names[to], [names[from]]);
                    }
                }

                let graph = ScheduleGraph::new(&job, &GraphConfig::strict()).unwrap();
                let result = graph.min_completion_time().unwrap();

                assert_close(result.min_completion_time, longest_path(&job));
                assert_topological(&job, &result.task_order);
            }
        }
    }
}
