//! Projection of a schedule onto calendar dates.

use chrono::{Days, NaiveDate};

use crate::analysis::ScheduleAnalysis;
use crate::models::ScheduledTask;

/// Date reached `offset_days` after `anchor`, or `None` when the offset is
/// not finite or the date falls outside the representable range.
///
/// Ceiling ensures fractional days round up to whole days, so a task never
/// appears to finish earlier on the calendar than it does in the schedule.
fn date_at(anchor: NaiveDate, offset_days: f64) -> Option<NaiveDate> {
    if !offset_days.is_finite() {
        return None;
    }
    let days = offset_days.ceil();
    if days >= 0.0 {
        anchor.checked_add_days(Days::new(days as u64))
    } else {
        anchor.checked_sub_days(Days::new((-days) as u64))
    }
}

impl ScheduleAnalysis {
    /// Place every task at its earliest start, counting days from `anchor`.
    ///
    /// Tasks come back in execution order. Returns `None` if any date would
    /// fall outside the calendar chrono can represent.
    pub fn project_onto_calendar(&self, anchor: NaiveDate) -> Option<Vec<ScheduledTask>> {
        self.timings()
            .map(|(task, timing)| {
                Some(ScheduledTask {
                    task_id: task.to_string(),
                    start_date: date_at(anchor, timing.earliest_start)?,
                    end_date: date_at(anchor, timing.earliest_finish)?,
                    duration_days: timing.earliest_finish - timing.earliest_start,
                    critical: timing.is_critical(),
                })
            })
            .collect()
    }

    /// Calendar date on which the whole job is done, `None` if out of range.
    pub fn completion_date(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        date_at(anchor, self.min_completion_time())
    }
}
