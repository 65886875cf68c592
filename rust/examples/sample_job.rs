//! Schedule a small six-task job and print the result.
//!
//! Run with `cargo run --example sample_job -- -v` for traversal logs.

use chrono::NaiveDate;
use job_makespan::{GraphConfig, JobDefinition, ScheduleError, ScheduleGraph};

fn main() -> Result<(), ScheduleError> {
    let verbosity = std::env::args().filter(|arg| arg == "-v").count() as u8;

    let job = JobDefinition::from_parts(
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
    );

    let graph = ScheduleGraph::new(&job, &GraphConfig::strict().with_verbosity(verbosity))?;
    let analysis = graph.analyze()?;

    println!(
        "Minimum completion time: {} units",
        analysis.min_completion_time()
    );
    println!("Task order: {:?}", analysis.result.task_order);
    println!("Critical path: {:?}", analysis.critical_path());

    let anchor = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default();
    for task in analysis.project_onto_calendar(anchor).unwrap_or_default() {
        println!(
            "  {:<2} {} -> {}{}",
            task.task_id,
            task.start_date,
            task.end_date,
            if task.critical { "  (critical)" } else { "" }
        );
    }

    Ok(())
}
