//! Referential and completeness checks on a job definition.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::interner::TaskIndex;
use crate::models::JobDefinition;

/// What a `ValidationError` is complaining about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// A dependency key, prerequisite or duration key is not a declared task.
    /// Takes precedence over `DuplicateTask`.
    UnknownTask,
    /// The same task was declared more than once (and nothing unknown is
    /// referenced).
    DuplicateTask,
    /// A declared task has no duration.
    MissingDuration,
    /// A declared task has a negative, NaN or infinite duration.
    InvalidDuration,
}

impl ValidationKind {
    /// Whether this kind is raised by the referential (dependency) check
    /// rather than the duration completeness check.
    pub fn is_referential(self) -> bool {
        matches!(self, Self::UnknownTask | Self::DuplicateTask)
    }
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTask => write!(f, "Invalid dependencies, not in the tasks list"),
            Self::DuplicateTask => write!(f, "Tasks declared more than once"),
            Self::MissingDuration => write!(f, "Missing completion times for tasks"),
            Self::InvalidDuration => write!(f, "Negative or non-finite completion times"),
        }
    }
}

/// Input rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {}", .task_ids.join(", "))]
pub struct ValidationError {
    pub kind: ValidationKind,
    /// Offending identifiers, in first-seen order without repeats.
    pub task_ids: Vec<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, task_ids: Vec<String>) -> Self {
        Self { kind, task_ids }
    }
}

/// Accumulates offending identifiers once each, preserving first-seen order.
#[derive(Default)]
struct Offenders<'a> {
    seen: FxHashSet<&'a str>,
    ids: Vec<&'a str>,
}

impl<'a> Offenders<'a> {
    fn push(&mut self, id: &'a str) {
        if self.seen.insert(id) {
            self.ids.push(id);
        }
    }

    fn into_result(self, kind: ValidationKind) -> Result<(), ValidationError> {
        if self.ids.is_empty() {
            return Ok(());
        }
        Err(ValidationError::new(
            kind,
            self.ids.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Every identifier the job mentions must be a declared task, declared once.
///
/// Unknown references are reported before duplicates, so a job with both
/// problems always names the undeclared tasks first.
pub(crate) fn check_references(
    job: &JobDefinition,
    index: &TaskIndex,
) -> Result<(), ValidationError> {
    let mut unknown = Offenders::default();
    for (task, prerequisites) in &job.dependencies {
        if !index.contains(task) {
            unknown.push(task);
        }
        for prerequisite in prerequisites {
            if !index.contains(prerequisite) {
                unknown.push(prerequisite);
            }
        }
    }
    for (task, _) in &job.durations {
        if !index.contains(task) {
            unknown.push(task);
        }
    }
    unknown.into_result(ValidationKind::UnknownTask)?;

    let mut declared: FxHashSet<&str> = FxHashSet::default();
    let mut duplicates = Offenders::default();
    for task in &job.tasks {
        if !declared.insert(task.as_str()) {
            duplicates.push(task);
        }
    }
    duplicates.into_result(ValidationKind::DuplicateTask)
}

/// Every declared task must have a finite, non-negative duration.
///
/// `durations` is indexed by task position, as built by the graph.
pub(crate) fn check_durations(
    index: &TaskIndex,
    durations: &[Option<f64>],
) -> Result<(), ValidationError> {
    let mut missing = Offenders::default();
    let mut invalid = Offenders::default();
    for (name, duration) in index.names().iter().zip(durations) {
        match duration {
            None => missing.push(name),
            Some(d) if !d.is_finite() || *d < 0.0 => invalid.push(name),
            Some(_) => {}
        }
    }
    missing.into_result(ValidationKind::MissingDuration)?;
    invalid.into_result(ValidationKind::InvalidDuration)
}
