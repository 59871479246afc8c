//! Read-side roll-up of leave requests.
//!
//! Aggregation is pure over an already-scoped population: role-based
//! visibility is applied by `services::scope` before the records reach this
//! module, never by filtering the output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{CalendarIndex, working_days};
use crate::database::models::{LeaveRequest, LeaveStatus, LeaveType};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotals {
    pub requests: i64,
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatsReport {
    pub total: BucketTotals,
    pub by_status: BTreeMap<LeaveStatus, BucketTotals>,
    pub by_type: BTreeMap<LeaveType, BTreeMap<LeaveStatus, BucketTotals>>,
}

/// Inclusive January 1 .. December 31 window for a stats year. Years beyond
/// chrono's representable range are a validation error, not a panic; the
/// value arrives straight from the stats query string.
pub fn year_window(year: i32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::Validation(format!("year {} is out of range", year))),
    }
}

/// Rolls up `requests` over the index's window. Each request's span is
/// clamped to the window and its `days` contribution is the working-day
/// count of the clamped span; requests entirely outside the window are
/// skipped. Output ordering is fixed (BTreeMap), so identical input yields
/// identical output.
pub fn aggregate(requests: &[LeaveRequest], index: &CalendarIndex) -> LeaveStatsReport {
    let (window_start, window_end) = index.window();
    let mut report = LeaveStatsReport::default();

    for request in requests {
        let start = request.start_date.max(window_start);
        let end = request.end_date.min(window_end);
        if start > end {
            continue;
        }

        let days = working_days(start, end, index).working_days;

        report.total.requests += 1;
        report.total.days += days;

        let by_status = report.by_status.entry(request.status).or_default();
        by_status.requests += 1;
        by_status.days += days;

        let by_type = report
            .by_type
            .entry(request.leave_type)
            .or_default()
            .entry(request.status)
            .or_default();
        by_type.requests += 1;
        by_type.days += days;
    }

    report
}
