use chrono::NaiveDate;
use serde::Serialize;

use super::{CalendarIndex, EMPTY_PERIOD_MESSAGE};
use crate::error::AppError;

/// Derived working-day breakdown of one inclusive date span. Never persisted
/// or cached; the exception calendar can change between computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingDaySummary {
    pub total_days: i64,
    pub working_days: i64,
    pub excluded_days: i64,
}

/// Counts working days in `[start, end]` inclusive. Callers must have
/// checked `start <= end` already; ordering is workflow-level validation.
pub fn working_days(start: NaiveDate, end: NaiveDate, index: &CalendarIndex) -> WorkingDaySummary {
    debug_assert!(start <= end, "callers validate period ordering first");
    debug_assert!(index.covers(start, end), "index window must cover the query span");

    let total_days = (end - start).num_days() + 1;

    let mut excluded_days = 0i64;
    let mut day = start;
    while day <= end {
        if index.is_exception(day) {
            excluded_days += 1;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    WorkingDaySummary {
        total_days,
        working_days: total_days - excluded_days,
        excluded_days,
    }
}

/// The one rule at this layer: a leave period must contain at least one
/// working day.
pub fn validate_period(
    start: NaiveDate,
    end: NaiveDate,
    index: &CalendarIndex,
) -> Result<WorkingDaySummary, AppError> {
    let summary = working_days(start, end, index);
    if summary.working_days == 0 {
        return Err(AppError::Validation(EMPTY_PERIOD_MESSAGE.to_string()));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::database::models::{ExceptionDay, ExceptionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn span(kind: ExceptionKind, start: NaiveDate, end: NaiveDate) -> ExceptionDay {
        ExceptionDay {
            id: Uuid::new_v4(),
            kind,
            start_date: start,
            end_date: end,
            label: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn single_day_on_plain_date() {
        let index = CalendarIndex::empty(date(2024, 3, 5), date(2024, 3, 5));
        let summary = working_days(date(2024, 3, 5), date(2024, 3, 5), &index);
        assert_eq!(
            summary,
            WorkingDaySummary {
                total_days: 1,
                working_days: 1,
                excluded_days: 0,
            }
        );
    }

    #[test]
    fn single_day_holiday_counts_zero_working() {
        let spans = vec![span(
            ExceptionKind::Holiday,
            date(2024, 3, 5),
            date(2024, 3, 5),
        )];
        let index = CalendarIndex::from_spans(date(2024, 3, 5), date(2024, 3, 5), &spans);
        let summary = working_days(date(2024, 3, 5), date(2024, 3, 5), &index);
        assert_eq!(summary.working_days, 0);
        assert_eq!(summary.excluded_days, 1);
    }

    // Monday 2024-01-01 through Friday 2024-01-05, no exceptions registered.
    #[test]
    fn full_week_without_exceptions() {
        let index = CalendarIndex::empty(date(2024, 1, 1), date(2024, 1, 5));
        let summary = working_days(date(2024, 1, 1), date(2024, 1, 5), &index);
        assert_eq!(summary.total_days, 5);
        assert_eq!(summary.working_days, 5);
        assert_eq!(summary.excluded_days, 0);
    }

    // Same range, but Jan 1 is a holiday and Jan 6-7 a weekend span that
    // falls entirely outside the queried range.
    #[test]
    fn holiday_inside_weekend_outside() {
        let spans = vec![
            span(ExceptionKind::Holiday, date(2024, 1, 1), date(2024, 1, 1)),
            span(ExceptionKind::Weekend, date(2024, 1, 6), date(2024, 1, 7)),
        ];
        let index = CalendarIndex::from_spans(date(2024, 1, 1), date(2024, 1, 5), &spans);
        let summary = working_days(date(2024, 1, 1), date(2024, 1, 5), &index);
        assert_eq!(summary.total_days, 5);
        assert_eq!(summary.working_days, 4);
        assert_eq!(summary.excluded_days, 1);
    }

    #[test]
    fn validator_rejects_all_exception_period() {
        let spans = vec![span(
            ExceptionKind::Weekend,
            date(2024, 1, 6),
            date(2024, 1, 7),
        )];
        let index = CalendarIndex::from_spans(date(2024, 1, 6), date(2024, 1, 7), &spans);

        let err = validate_period(date(2024, 1, 6), date(2024, 1, 7), &index).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, EMPTY_PERIOD_MESSAGE),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn validator_passes_partial_exception_period() {
        let spans = vec![span(
            ExceptionKind::Weekend,
            date(2024, 1, 6),
            date(2024, 1, 7),
        )];
        let index = CalendarIndex::from_spans(date(2024, 1, 5), date(2024, 1, 7), &spans);

        let summary = validate_period(date(2024, 1, 5), date(2024, 1, 7), &index).unwrap();
        assert_eq!(summary.working_days, 1);
    }
}
