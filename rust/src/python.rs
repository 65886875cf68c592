//! Python bindings (feature `python`).
//!
//! Mirrors the constructor shape Python callers already use: a task list,
//! a `{task: prerequisites}` dict and a `{task: duration}` dict, with both
//! validations off unless requested. Dict insertion order is preserved, so
//! the returned task order is the same one the dicts imply.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::GraphConfig;
use crate::graph::ScheduleGraph;
use crate::models::JobDefinition;

fn to_py_err(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Dependency graph of a job (PyO3 wrapper).
#[pyclass(name = "ScheduleGraph", frozen)]
pub struct PyScheduleGraph {
    inner: ScheduleGraph,
}

#[pymethods]
impl PyScheduleGraph {
    #[new]
    #[pyo3(signature = (
        tasks,
        dependencies,
        completion_times,
        validate_dependencies=false,
        validate_completion_time=false,
        verbosity=0
    ))]
    fn new(
        tasks: Vec<String>,
        dependencies: &Bound<'_, PyDict>,
        completion_times: &Bound<'_, PyDict>,
        validate_dependencies: bool,
        validate_completion_time: bool,
        verbosity: u8,
    ) -> PyResult<Self> {
        let mut job = JobDefinition {
            tasks,
            ..JobDefinition::default()
        };

        // Prerequisites may be any iterable (list, tuple, set).
        for (task, prereqs) in dependencies.iter() {
            let prereqs = prereqs
                .iter()?
                .map(|p| p.and_then(|p| p.extract::<String>()))
                .collect::<PyResult<Vec<String>>>()?;
            job.dependencies.push((task.extract()?, prereqs));
        }
        for (task, duration) in completion_times.iter() {
            job.durations.push((task.extract()?, duration.extract()?));
        }

        let config = GraphConfig {
            validate_dependencies,
            validate_durations: validate_completion_time,
            verbosity,
        };
        let inner = ScheduleGraph::new(&job, &config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Returns `(minimum completion time, task order)`.
    ///
    /// Raises ValueError if the dependencies contain a cycle.
    fn get_minimum_completion_time(&self) -> PyResult<(f64, Vec<String>)> {
        let result = self.inner.min_completion_time().map_err(to_py_err)?;
        Ok((result.min_completion_time, result.task_order))
    }

    /// Zero-slack tasks in execution order.
    fn critical_tasks(&self) -> PyResult<Vec<String>> {
        let analysis = self.inner.analyze().map_err(to_py_err)?;
        Ok(analysis
            .critical_tasks()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Calendar date the job is done when it starts on `anchor`.
    ///
    /// Raises ValueError if that date is outside the supported range.
    fn completion_date(&self, anchor: NaiveDate) -> PyResult<NaiveDate> {
        let analysis = self.inner.analyze().map_err(to_py_err)?;
        analysis.completion_date(anchor).ok_or_else(|| {
            PyValueError::new_err(format!(
                "Completion date out of range: {} days after {}",
                analysis.min_completion_time(),
                anchor
            ))
        })
    }

    fn blocked_tasks(&self) -> Vec<String> {
        self.inner.blocked_tasks()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("ScheduleGraph(tasks={})", self.inner.len())
    }
}

/// The job_makespan Python module.
#[pymodule]
fn job_makespan(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyScheduleGraph>()?;
    Ok(())
}
