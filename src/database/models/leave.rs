use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single employee's time-off ask, with its full authorization trail.
///
/// `paid_leave_days + unpaid_leave_days` always equals the working-day count
/// of `[start_date, end_date]` once any approval has touched the request;
/// the workflow module is the only code allowed to mutate these fields.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub department_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: String,
    pub status: LeaveStatus,
    /// Candidate approvers, snapshotted from the department at submission.
    pub dept_head_ids: Vec<Uuid>,
    pub dept_head_id: Option<Uuid>,
    pub dept_head_action: Option<DecisionAction>,
    pub dept_head_comment: Option<String>,
    pub dept_head_action_at: Option<DateTime<Utc>>,
    pub admin_id: Option<Uuid>,
    pub admin_action: Option<DecisionAction>,
    pub admin_comment: Option<String>,
    pub admin_action_at: Option<DateTime<Utc>>,
    pub paid_leave_days: i32,
    pub unpaid_leave_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub employee_id: Uuid,
    pub department_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: String,
}

/// A department-head or admin ruling on a pending request. Revised dates and
/// a paid-day count may accompany an approval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    pub action: DecisionAction,
    pub comment: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub paid_leave_days: Option<i32>,
}

/// Sparse patch for direct edits; only provided fields are overwritten.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub leave_type: Option<LeaveType>,
    pub reason: Option<String>,
    pub paid_leave_days: Option<i32>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "leave_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Casual,
    Medical,
    Annual,
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeaveType::Casual => "casual",
            LeaveType::Medical => "medical",
            LeaveType::Annual => "annual",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "casual" => Ok(LeaveType::Casual),
            "medical" => Ok(LeaveType::Medical),
            "annual" => Ok(LeaveType::Annual),
            other => Err(format!("Invalid leave type: {}", other)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "leave_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    PendingDeptHead,
    PendingAdmin,
    Approved,
    Rejected,
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeaveStatus::PendingDeptHead => "pending_dept_head",
            LeaveStatus::PendingAdmin => "pending_admin",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending_dept_head" => Ok(LeaveStatus::PendingDeptHead),
            "pending_admin" => Ok(LeaveStatus::PendingAdmin),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            other => Err(format!("Invalid leave status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "decision_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approved,
    Rejected,
}
