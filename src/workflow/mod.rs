//! Leave-request state machine.
//!
//! Transitions here are pure: they mutate an in-memory [`LeaveRequest`]
//! against a [`CalendarIndex`] and report validation failures without doing
//! any I/O. `services::leave` owns persistence and notification side effects
//! and commits a request only after a transition succeeded, so a failed
//! transition never leaves a half-applied record behind.
//!
//! States: `pending_dept_head` -> `pending_admin` -> `approved`, with
//! `rejected` reachable from either pending state. `approved` and `rejected`
//! are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::calendar::{CalendarIndex, validate_period};
use crate::database::models::{
    DecisionAction, DecisionInput, LeaveRequest, LeaveRequestInput, LeaveRequestPatch, LeaveStatus,
};
use crate::error::AppError;

pub fn check_period_order(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation(
            "start date cannot be after end date".to_string(),
        ));
    }
    Ok(())
}

/// Splits a working-day count into paid/unpaid buckets. A paid count larger
/// than the working-day count is an error, never silently clamped.
pub fn allocate(working_days: i64, paid_days: i32) -> Result<(i32, i32), AppError> {
    if paid_days < 0 {
        return Err(AppError::Validation(
            "paid leave days cannot be negative".to_string(),
        ));
    }
    if i64::from(paid_days) > working_days {
        return Err(AppError::Validation(format!(
            "Paid leave days ({}) cannot exceed total working days ({})",
            paid_days, working_days
        )));
    }
    Ok((paid_days, (working_days - i64::from(paid_days)) as i32))
}

/// The period a decision rules on: revised dates when supplied, the
/// request's stored dates otherwise.
pub fn effective_period(request: &LeaveRequest, decision: &DecisionInput) -> (NaiveDate, NaiveDate) {
    (
        decision.start_date.unwrap_or(request.start_date),
        decision.end_date.unwrap_or(request.end_date),
    )
}

/// Builds a freshly submitted request. Full pay until told otherwise:
/// `paid = working days`, `unpaid = 0`.
pub fn build_request(
    input: &LeaveRequestInput,
    dept_head_ids: Vec<Uuid>,
    index: &CalendarIndex,
    now: DateTime<Utc>,
) -> Result<LeaveRequest, AppError> {
    check_period_order(input.start_date, input.end_date)?;
    let summary = validate_period(input.start_date, input.end_date, index)?;
    let (paid, unpaid) = allocate(summary.working_days, summary.working_days as i32)?;

    Ok(LeaveRequest {
        id: Uuid::new_v4(),
        employee_id: input.employee_id,
        department_id: input.department_id,
        start_date: input.start_date,
        end_date: input.end_date,
        leave_type: input.leave_type,
        reason: input.reason.clone(),
        status: LeaveStatus::PendingDeptHead,
        dept_head_ids,
        dept_head_id: None,
        dept_head_action: None,
        dept_head_comment: None,
        dept_head_action_at: None,
        admin_id: None,
        admin_action: None,
        admin_comment: None,
        admin_action_at: None,
        paid_leave_days: paid,
        unpaid_leave_days: unpaid,
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_dept_head_decision(
    request: &mut LeaveRequest,
    dept_head_id: Uuid,
    decision: &DecisionInput,
    index: &CalendarIndex,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match request.status {
        LeaveStatus::PendingDeptHead => {}
        LeaveStatus::PendingAdmin => {
            return Err(AppError::Validation(
                "request is already awaiting the admin decision".to_string(),
            ));
        }
        LeaveStatus::Approved | LeaveStatus::Rejected => {
            return Err(AppError::Validation(format!(
                "request is already {}",
                request.status
            )));
        }
    }

    if !request.dept_head_ids.contains(&dept_head_id) {
        return Err(AppError::Forbidden(
            "only a department head assigned to this request may decide it".to_string(),
        ));
    }

    match decision.action {
        DecisionAction::Approved => {
            approve_period(request, decision, index)?;
            request.status = LeaveStatus::PendingAdmin;
        }
        DecisionAction::Rejected => {
            // Rejection leaves dates and allocation untouched.
            request.status = LeaveStatus::Rejected;
        }
    }

    request.dept_head_id = Some(dept_head_id);
    request.dept_head_action = Some(decision.action);
    request.dept_head_comment = decision.comment.clone();
    request.dept_head_action_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Admins rule only on requests the department head has passed along;
/// acting on a `pending_dept_head` request is rejected outright.
pub fn apply_admin_decision(
    request: &mut LeaveRequest,
    admin_id: Uuid,
    decision: &DecisionInput,
    index: &CalendarIndex,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    match request.status {
        LeaveStatus::PendingAdmin => {}
        LeaveStatus::PendingDeptHead => {
            return Err(AppError::Validation(
                "request is still awaiting the department head decision".to_string(),
            ));
        }
        LeaveStatus::Approved | LeaveStatus::Rejected => {
            return Err(AppError::Validation(format!(
                "request is already {}",
                request.status
            )));
        }
    }

    match decision.action {
        DecisionAction::Approved => {
            approve_period(request, decision, index)?;
            request.status = LeaveStatus::Approved;
        }
        DecisionAction::Rejected => {
            request.status = LeaveStatus::Rejected;
        }
    }

    request.admin_id = Some(admin_id);
    request.admin_action = Some(decision.action);
    request.admin_comment = decision.comment.clone();
    request.admin_action_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Shared approval arithmetic: take the (possibly revised) period, re-run the
/// period validator, and re-derive the paid/unpaid split. When the decision
/// carries no paid count the request's current one is kept, which still must
/// fit the recomputed working days.
fn approve_period(
    request: &mut LeaveRequest,
    decision: &DecisionInput,
    index: &CalendarIndex,
) -> Result<(), AppError> {
    let (start, end) = effective_period(request, decision);
    check_period_order(start, end)?;
    let summary = validate_period(start, end, index)?;

    let requested_paid = decision.paid_leave_days.unwrap_or(request.paid_leave_days);
    let (paid, unpaid) = allocate(summary.working_days, requested_paid)?;

    request.start_date = start;
    request.end_date = end;
    request.paid_leave_days = paid;
    request.unpaid_leave_days = unpaid;
    Ok(())
}

/// Direct edit: a sparse patch merged field by field. Allowed in any
/// non-terminal state and never changes `status`.
pub fn apply_patch(
    request: &mut LeaveRequest,
    patch: &LeaveRequestPatch,
    index: &CalendarIndex,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if request.is_terminal() {
        return Err(AppError::Validation(format!(
            "cannot edit a request that is already {}",
            request.status
        )));
    }

    let start = patch.start_date.unwrap_or(request.start_date);
    let end = patch.end_date.unwrap_or(request.end_date);
    check_period_order(start, end)?;

    let dates_changed = start != request.start_date || end != request.end_date;
    if dates_changed || patch.paid_leave_days.is_some() {
        let summary = validate_period(start, end, index)?;
        let requested_paid = patch.paid_leave_days.unwrap_or(request.paid_leave_days);
        let (paid, unpaid) = allocate(summary.working_days, requested_paid)?;
        request.paid_leave_days = paid;
        request.unpaid_leave_days = unpaid;
    }

    request.start_date = start;
    request.end_date = end;
    if let Some(leave_type) = patch.leave_type {
        request.leave_type = leave_type;
    }
    if let Some(reason) = &patch.reason {
        request.reason = reason.clone();
    }
    request.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::database::models::{ExceptionDay, ExceptionKind, LeaveType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekend(start: NaiveDate, end: NaiveDate) -> ExceptionDay {
        ExceptionDay {
            id: Uuid::new_v4(),
            kind: ExceptionKind::Weekend,
            start_date: start,
            end_date: end,
            label: None,
            created_at: Utc::now(),
        }
    }

    fn submit_input(start: NaiveDate, end: NaiveDate) -> LeaveRequestInput {
        LeaveRequestInput {
            employee_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            leave_type: LeaveType::Annual,
            reason: "family visit".to_string(),
        }
    }

    fn decision(action: DecisionAction, paid: Option<i32>) -> DecisionInput {
        DecisionInput {
            action,
            comment: Some("noted".to_string()),
            start_date: None,
            end_date: None,
            paid_leave_days: paid,
        }
    }

    // Five plain working days, one assigned department head.
    fn pending_request() -> (LeaveRequest, Uuid, CalendarIndex) {
        let index = CalendarIndex::empty(date(2024, 1, 1), date(2024, 1, 5));
        let head = Uuid::new_v4();
        let request = build_request(
            &submit_input(date(2024, 1, 1), date(2024, 1, 5)),
            vec![head],
            &index,
            Utc::now(),
        )
        .unwrap();
        (request, head, index)
    }

    #[test]
    fn submission_defaults_to_full_pay() {
        let (request, _, _) = pending_request();
        assert_eq!(request.status, LeaveStatus::PendingDeptHead);
        assert_eq!(request.paid_leave_days, 5);
        assert_eq!(request.unpaid_leave_days, 0);
    }

    #[test]
    fn submission_rejects_inverted_period() {
        let index = CalendarIndex::empty(date(2024, 1, 1), date(2024, 1, 5));
        let err = build_request(
            &submit_input(date(2024, 1, 5), date(2024, 1, 1)),
            vec![],
            &index,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn submission_rejects_all_weekend_period() {
        let spans = vec![weekend(date(2024, 1, 6), date(2024, 1, 7))];
        let index = CalendarIndex::from_spans(date(2024, 1, 6), date(2024, 1, 7), &spans);
        let err = build_request(
            &submit_input(date(2024, 1, 6), date(2024, 1, 7)),
            vec![],
            &index,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "period contains only holidays and weekends")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn dept_head_approval_splits_paid_and_unpaid() {
        let (mut request, head, index) = pending_request();

        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Approved, Some(3)),
            &index,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(request.status, LeaveStatus::PendingAdmin);
        assert_eq!(request.paid_leave_days, 3);
        assert_eq!(request.unpaid_leave_days, 2);
        assert_eq!(request.dept_head_action, Some(DecisionAction::Approved));
        assert!(request.dept_head_action_at.is_some());
    }

    #[test]
    fn dept_head_approval_rejects_excess_paid_days() {
        let (mut request, head, index) = pending_request();
        let before = request.clone();

        let err = apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Approved, Some(7)),
            &index,
            Utc::now(),
        )
        .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Paid leave days (7) cannot exceed total working days (5)")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        // No state mutation on a failed transition.
        assert_eq!(request.status, before.status);
        assert_eq!(request.paid_leave_days, before.paid_leave_days);
        assert_eq!(request.dept_head_action, None);
    }

    #[test]
    fn dept_head_rejection_keeps_dates_and_allocation() {
        let (mut request, head, index) = pending_request();

        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Rejected, None),
            &index,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(request.status, LeaveStatus::Rejected);
        assert_eq!(request.start_date, date(2024, 1, 1));
        assert_eq!(request.paid_leave_days, 5);
        assert_eq!(request.unpaid_leave_days, 0);
    }

    #[test]
    fn unassigned_head_cannot_decide() {
        let (mut request, _, index) = pending_request();

        let err = apply_dept_head_decision(
            &mut request,
            Uuid::new_v4(),
            &decision(DecisionAction::Approved, None),
            &index,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(request.status, LeaveStatus::PendingDeptHead);
    }

    #[test]
    fn dept_head_approval_with_revised_dates_revalidates() {
        let (mut request, head, _) = pending_request();
        // Revised period overlaps a weekend: Jan 4 (Thu) .. Jan 7 (Sun).
        let spans = vec![weekend(date(2024, 1, 6), date(2024, 1, 7))];
        let index = CalendarIndex::from_spans(date(2024, 1, 1), date(2024, 1, 7), &spans);

        let revision = DecisionInput {
            action: DecisionAction::Approved,
            comment: None,
            start_date: Some(date(2024, 1, 4)),
            end_date: Some(date(2024, 1, 7)),
            paid_leave_days: Some(2),
        };
        apply_dept_head_decision(&mut request, head, &revision, &index, Utc::now()).unwrap();

        assert_eq!(request.start_date, date(2024, 1, 4));
        assert_eq!(request.end_date, date(2024, 1, 7));
        // 4 total days, 2 weekend days excluded -> 2 working days.
        assert_eq!(request.paid_leave_days, 2);
        assert_eq!(request.unpaid_leave_days, 0);
    }

    #[test]
    fn admin_cannot_act_before_dept_head() {
        let (mut request, _, index) = pending_request();

        let err = apply_admin_decision(
            &mut request,
            Uuid::new_v4(),
            &decision(DecisionAction::Approved, None),
            &index,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(request.status, LeaveStatus::PendingDeptHead);
    }

    #[test]
    fn admin_approval_finalizes_request() {
        let (mut request, head, index) = pending_request();
        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Approved, Some(3)),
            &index,
            Utc::now(),
        )
        .unwrap();

        let admin = Uuid::new_v4();
        apply_admin_decision(
            &mut request,
            admin,
            &decision(DecisionAction::Approved, None),
            &index,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(request.status, LeaveStatus::Approved);
        assert_eq!(request.admin_id, Some(admin));
        // The dept head's split survives an admin approval without a count.
        assert_eq!(request.paid_leave_days, 3);
        assert_eq!(request.unpaid_leave_days, 2);
        assert_eq!(
            i64::from(request.paid_leave_days + request.unpaid_leave_days),
            5
        );
    }

    #[test]
    fn terminal_states_never_transition_again() {
        let (mut request, head, index) = pending_request();
        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Rejected, None),
            &index,
            Utc::now(),
        )
        .unwrap();

        let err = apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Approved, None),
            &index,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = apply_admin_decision(
            &mut request,
            Uuid::new_v4(),
            &decision(DecisionAction::Approved, None),
            &index,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(request.status, LeaveStatus::Rejected);
    }

    #[test]
    fn patch_merges_only_provided_fields() {
        let (mut request, _, index) = pending_request();
        let original_reason = request.reason.clone();

        let patch = LeaveRequestPatch {
            leave_type: Some(LeaveType::Medical),
            ..Default::default()
        };
        apply_patch(&mut request, &patch, &index, Utc::now()).unwrap();

        assert_eq!(request.leave_type, LeaveType::Medical);
        assert_eq!(request.reason, original_reason);
        assert_eq!(request.start_date, date(2024, 1, 1));
        assert_eq!(request.status, LeaveStatus::PendingDeptHead);
    }

    #[test]
    fn patch_with_new_dates_rederives_allocation() {
        let (mut request, head, index) = pending_request();
        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Approved, Some(3)),
            &index,
            Utc::now(),
        )
        .unwrap();

        let patch = LeaveRequestPatch {
            start_date: Some(date(2024, 1, 2)),
            end_date: Some(date(2024, 1, 5)),
            ..Default::default()
        };
        apply_patch(&mut request, &patch, &index, Utc::now()).unwrap();

        // 4 working days; paid stays 3, unpaid re-derived to 1.
        assert_eq!(request.paid_leave_days, 3);
        assert_eq!(request.unpaid_leave_days, 1);
        assert_eq!(request.status, LeaveStatus::PendingAdmin);
    }

    #[test]
    fn patch_rejects_paid_days_beyond_shrunk_period() {
        let (mut request, _, index) = pending_request();

        let patch = LeaveRequestPatch {
            end_date: Some(date(2024, 1, 2)),
            ..Default::default()
        };
        let err = apply_patch(&mut request, &patch, &index, Utc::now()).unwrap_err();
        // Existing paid count (5) no longer fits the 2 working days.
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(request.end_date, date(2024, 1, 5));
    }

    #[test]
    fn patch_refuses_terminal_request() {
        let (mut request, head, index) = pending_request();
        apply_dept_head_decision(
            &mut request,
            head,
            &decision(DecisionAction::Rejected, None),
            &index,
            Utc::now(),
        )
        .unwrap();

        let patch = LeaveRequestPatch {
            reason: Some("changed my mind".to_string()),
            ..Default::default()
        };
        let err = apply_patch(&mut request, &patch, &index, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
