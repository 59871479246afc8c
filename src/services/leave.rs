//! Orchestration around the pure workflow: load, transition, persist, then
//! fan out notifications. Every operation commits before any notification
//! is attempted.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::calendar::CalendarIndex;
use crate::database::models::{
    DecisionAction, DecisionInput, EmployeeRole, LeaveRequest, LeaveRequestInput,
    LeaveRequestPatch, LeaveStatus, LeaveType,
};
use crate::database::repositories::{
    CalendarRepository, EmployeeRepository, LeaveQuery, LeaveRequestRepository,
};
use crate::error::AppError;
use crate::services::notifications::NotificationService;
use crate::services::scope;
use crate::stats::{self, LeaveStatsReport};
use crate::workflow;

#[derive(Debug, Clone, Default)]
pub struct StatsRequest {
    pub year: i32,
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

#[derive(Clone)]
pub struct LeaveService {
    leaves: LeaveRequestRepository,
    calendar: CalendarRepository,
    employees: EmployeeRepository,
    notifications: NotificationService,
}

impl LeaveService {
    pub fn new(
        leaves: LeaveRequestRepository,
        calendar: CalendarRepository,
        employees: EmployeeRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            leaves,
            calendar,
            employees,
            notifications,
        }
    }

    /// Builds a membership index for the window. A calendar-source failure
    /// fails the whole operation; assuming "no holidays" would quietly
    /// bypass the period validator.
    async fn calendar_index(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CalendarIndex, AppError> {
        let spans = self
            .calendar
            .spans_intersecting(start, end)
            .await
            .map_err(AppError::from)?;
        Ok(CalendarIndex::from_spans(start, end, &spans))
    }

    pub async fn submit(&self, input: LeaveRequestInput) -> Result<LeaveRequest, AppError> {
        let employee = self
            .employees
            .find(input.employee_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("employee not found".to_string()))?;

        workflow::check_period_order(input.start_date, input.end_date)?;
        let index = self.calendar_index(input.start_date, input.end_date).await?;
        let dept_head_ids = self
            .employees
            .department_heads(input.department_id)
            .await
            .map_err(AppError::from)?;

        let request = workflow::build_request(&input, dept_head_ids, &index, Utc::now())?;
        let created = self.leaves.create(&request).await.map_err(AppError::from)?;

        self.notifications
            .notify(
                &created.dept_head_ids,
                "leave_submitted",
                "New leave request",
                &format!(
                    "{} requested {} leave from {} to {}",
                    employee.name, created.leave_type, created.start_date, created.end_date
                ),
            )
            .await;

        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<LeaveRequest, AppError> {
        self.leaves
            .find(id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("leave request not found".to_string()))
    }

    pub async fn list(&self, query: &LeaveQuery) -> Result<Vec<LeaveRequest>, AppError> {
        self.leaves.list(query).await.map_err(AppError::from)
    }

    pub async fn dept_head_decision(
        &self,
        id: Uuid,
        dept_head_id: Uuid,
        decision: DecisionInput,
    ) -> Result<LeaveRequest, AppError> {
        let mut request = self.get(id).await?;

        let (start, end) = workflow::effective_period(&request, &decision);
        workflow::check_period_order(start, end)?;
        let index = self.calendar_index(start, end).await?;

        workflow::apply_dept_head_decision(&mut request, dept_head_id, &decision, &index, Utc::now())?;
        let saved = self.leaves.save(&request).await.map_err(AppError::from)?;

        match decision.action {
            DecisionAction::Approved => {
                let admin_ids = self.admin_ids().await;
                self.notifications
                    .notify(
                        &admin_ids,
                        "leave_awaiting_admin",
                        "Leave request awaiting admin decision",
                        &format!(
                            "Request {} was approved by the department head ({} paid / {} unpaid days)",
                            saved.id, saved.paid_leave_days, saved.unpaid_leave_days
                        ),
                    )
                    .await;
                for address in self.admin_emails().await {
                    self.notifications
                        .email(
                            &address,
                            "Leave request awaiting your decision",
                            &format!(
                                "Leave request {} ({} to {}) has passed department-head review.",
                                saved.id, saved.start_date, saved.end_date
                            ),
                        )
                        .await;
                }
                self.notifications
                    .notify(
                        &[saved.employee_id],
                        "leave_dept_head_approved",
                        "Leave request moved forward",
                        "Your leave request was approved by your department head and is awaiting the admin decision",
                    )
                    .await;
            }
            DecisionAction::Rejected => {
                self.send_rejection(&saved, saved.dept_head_comment.as_deref())
                    .await;
            }
        }

        Ok(saved)
    }

    pub async fn admin_decision(
        &self,
        id: Uuid,
        admin_id: Uuid,
        decision: DecisionInput,
    ) -> Result<LeaveRequest, AppError> {
        let actor = self
            .employees
            .find(admin_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("admin not found".to_string()))?;
        if actor.role != EmployeeRole::Admin {
            return Err(AppError::Forbidden(
                "only admins may record an admin decision".to_string(),
            ));
        }

        let mut request = self.get(id).await?;

        let (start, end) = workflow::effective_period(&request, &decision);
        workflow::check_period_order(start, end)?;
        let index = self.calendar_index(start, end).await?;

        workflow::apply_admin_decision(&mut request, admin_id, &decision, &index, Utc::now())?;
        let saved = self.leaves.save(&request).await.map_err(AppError::from)?;

        match decision.action {
            DecisionAction::Approved => {
                self.notifications
                    .notify(
                        &[saved.employee_id],
                        "leave_approved",
                        "Leave request approved",
                        &format!(
                            "Your leave from {} to {} was approved ({} paid / {} unpaid days)",
                            saved.start_date,
                            saved.end_date,
                            saved.paid_leave_days,
                            saved.unpaid_leave_days
                        ),
                    )
                    .await;
                if let Some(address) = self.employee_email(saved.employee_id).await {
                    self.notifications
                        .email(
                            &address,
                            "Your leave request was approved",
                            &format!(
                                "Leave from {} to {} is approved with {} paid and {} unpaid days.",
                                saved.start_date,
                                saved.end_date,
                                saved.paid_leave_days,
                                saved.unpaid_leave_days
                            ),
                        )
                        .await;
                }
            }
            DecisionAction::Rejected => {
                self.send_rejection(&saved, saved.admin_comment.as_deref()).await;
            }
        }

        Ok(saved)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: LeaveRequestPatch,
    ) -> Result<LeaveRequest, AppError> {
        let mut request = self.get(id).await?;

        let start = patch.start_date.unwrap_or(request.start_date);
        let end = patch.end_date.unwrap_or(request.end_date);
        workflow::check_period_order(start, end)?;
        let index = self.calendar_index(start, end).await?;

        workflow::apply_patch(&mut request, &patch, &index, Utc::now())?;
        self.leaves.save(&request).await.map_err(AppError::from)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let request = self.get(id).await?;

        let removed = self.leaves.delete(id).await.map_err(AppError::from)?;
        if !removed {
            return Err(AppError::NotFound("leave request not found".to_string()));
        }

        self.notifications
            .notify(
                &[request.employee_id],
                "leave_deleted",
                "Leave request deleted",
                &format!(
                    "Your leave request from {} to {} was deleted",
                    request.start_date, request.end_date
                ),
            )
            .await;

        Ok(())
    }

    pub async fn stats(
        &self,
        actor_id: Uuid,
        request: &StatsRequest,
    ) -> Result<LeaveStatsReport, AppError> {
        let actor = self
            .employees
            .find(actor_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("employee not found".to_string()))?;

        let visibility = scope::visible_employees(&actor, &self.employees).await?;
        let employee_ids = visibility.restrict(request.employee_id)?;

        let query = LeaveQuery {
            employee_ids,
            department_id: request.department_id,
            status: request.status,
            leave_type: request.leave_type,
        };
        let population = self.leaves.list(&query).await.map_err(AppError::from)?;

        let (window_start, window_end) = stats::year_window(request.year)?;
        let index = self.calendar_index(window_start, window_end).await?;

        Ok(stats::aggregate(&population, &index))
    }

    async fn send_rejection(&self, request: &LeaveRequest, comment: Option<&str>) {
        debug_assert_eq!(request.status, LeaveStatus::Rejected);
        let reason = comment.unwrap_or("no reason given");

        self.notifications
            .notify(
                &[request.employee_id],
                "leave_rejected",
                "Leave request rejected",
                &format!("Your leave request was rejected: {}", reason),
            )
            .await;

        if let Some(address) = self.employee_email(request.employee_id).await {
            self.notifications
                .email(
                    &address,
                    "Your leave request was rejected",
                    &format!(
                        "Leave from {} to {} was rejected. Reason: {}",
                        request.start_date, request.end_date, reason
                    ),
                )
                .await;
        }
    }

    // Lookup failures here only cost a notification, never the operation.
    async fn employee_email(&self, id: Uuid) -> Option<String> {
        match self.employees.find(id).await {
            Ok(Some(employee)) => Some(employee.email),
            Ok(None) => {
                log::warn!("email recipient {} not found", id);
                None
            }
            Err(err) => {
                log::warn!("failed to look up email recipient {}: {}", id, err);
                None
            }
        }
    }

    async fn admin_ids(&self) -> Vec<Uuid> {
        match self.employees.admins().await {
            Ok(admins) => admins.into_iter().map(|a| a.id).collect(),
            Err(err) => {
                log::warn!("failed to list admins for notification: {}", err);
                Vec::new()
            }
        }
    }

    async fn admin_emails(&self) -> Vec<String> {
        match self.employees.admins().await {
            Ok(admins) => admins.into_iter().map(|a| a.email).collect(),
            Err(err) => {
                log::warn!("failed to list admin emails: {}", err);
                Vec::new()
            }
        }
    }
}
