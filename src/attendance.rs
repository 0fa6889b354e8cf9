//! Daily attendance accumulator.
//!
//! A record carries a transient mark for today plus persisted counters.
//! `set_today_mark` only touches the mark; `commit` folds it into
//! `(total_days, present_days)`, recomputes `attendance_ratio` and clears the
//! mark, so a second commit without a fresh mark is rejected. Commits are not
//! keyed by calendar date: callers commit at most once per school day.

use crate::calc::round_half_up;
use crate::error::{EngineError, EngineResult, ErrorKind};
use crate::model::{AttendanceMark, StudentRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTotals {
    pub total_days: u32,
    pub present_days: u32,
    pub attendance: i64,
}

impl AttendanceTotals {
    pub fn of(record: &StudentRecord) -> Self {
        Self {
            total_days: record.total_days,
            present_days: record.present_days,
            attendance: record.attendance_ratio,
        }
    }
}

pub fn attendance_ratio(present_days: u32, total_days: u32) -> i64 {
    if total_days == 0 {
        return 0;
    }
    round_half_up(present_days as f64 / total_days as f64 * 100.0).clamp(0, 100)
}

/// Selects today's mark. Re-selecting before commit overwrites.
pub fn set_today_mark(record: &mut StudentRecord, mark: AttendanceMark) {
    record.today_mark = Some(mark);
}

pub fn commit(record: &mut StudentRecord) -> EngineResult<AttendanceTotals> {
    let Some(mark) = record.today_mark.take() else {
        return Err(EngineError::new(
            ErrorKind::AccumulatorState,
            "select present or absent before committing",
        )
        .with_details(serde_json::json!({ "studentId": record.id })));
    };
    record.total_days = record.total_days.saturating_add(1);
    if mark == AttendanceMark::Present {
        record.present_days = record.present_days.saturating_add(1);
    }
    record.attendance_ratio = attendance_ratio(record.present_days, record.total_days);
    Ok(AttendanceTotals::of(record))
}
