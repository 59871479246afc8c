use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveStatus, LeaveType};

const COLUMNS: &str = "id, employee_id, department_id, start_date, end_date, leave_type, reason, \
     status, dept_head_ids, dept_head_id, dept_head_action, dept_head_comment, \
     dept_head_action_at, admin_id, admin_action, admin_comment, admin_action_at, \
     paid_leave_days, unpaid_leave_days, created_at, updated_at";

/// Filter for list/stats queries. `employee_ids` is the visibility scope; a
/// populated list restricts the population, `None` means unrestricted.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub employee_ids: Option<Vec<Uuid>>,
    pub department_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

enum Bind {
    Id(Uuid),
    Ids(Vec<Uuid>),
    Status(LeaveStatus),
    Type(LeaveType),
}

#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a request the workflow built; the id is already assigned.
    pub async fn create(&self, request: &LeaveRequest) -> Result<LeaveRequest> {
        let created = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, department_id, start_date, end_date, leave_type, reason,
                 status, dept_head_ids, paid_leave_days, unpaid_leave_days,
                 created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(request.id)
        .bind(request.employee_id)
        .bind(request.department_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.leave_type)
        .bind(&request.reason)
        .bind(request.status)
        .bind(&request.dept_head_ids)
        .bind(request.paid_leave_days)
        .bind(request.unpaid_leave_days)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Writes back a request mutated by the workflow. Full-row update; the
    /// transition already decided every field value.
    pub async fn save(&self, request: &LeaveRequest) -> Result<LeaveRequest> {
        let saved = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                start_date = $2,
                end_date = $3,
                leave_type = $4,
                reason = $5,
                status = $6,
                dept_head_id = $7,
                dept_head_action = $8,
                dept_head_comment = $9,
                dept_head_action_at = $10,
                admin_id = $11,
                admin_action = $12,
                admin_comment = $13,
                admin_action_at = $14,
                paid_leave_days = $15,
                unpaid_leave_days = $16,
                updated_at = $17
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(request.id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.leave_type)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.dept_head_id)
        .bind(request.dept_head_action)
        .bind(request.dept_head_comment.as_deref())
        .bind(request.dept_head_action_at)
        .bind(request.admin_id)
        .bind(request.admin_action)
        .bind(request.admin_comment.as_deref())
        .bind(request.admin_action_at)
        .bind(request.paid_leave_days)
        .bind(request.unpaid_leave_days)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    pub async fn list(&self, query: &LeaveQuery) -> Result<Vec<LeaveRequest>> {
        let mut sql = format!("SELECT {} FROM leave_requests", COLUMNS);
        let mut conditions = Vec::new();
        let mut binds: Vec<Bind> = Vec::new();

        if let Some(ids) = &query.employee_ids {
            conditions.push(format!("employee_id = ANY(${})", binds.len() + 1));
            binds.push(Bind::Ids(ids.clone()));
        }
        if let Some(department_id) = query.department_id {
            conditions.push(format!("department_id = ${}", binds.len() + 1));
            binds.push(Bind::Id(department_id));
        }
        if let Some(status) = query.status {
            conditions.push(format!("status = ${}", binds.len() + 1));
            binds.push(Bind::Status(status));
        }
        if let Some(leave_type) = query.leave_type {
            conditions.push(format!("leave_type = ${}", binds.len() + 1));
            binds.push(Bind::Type(leave_type));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, LeaveRequest>(&sql);
        for bind in binds {
            prepared = match bind {
                Bind::Id(v) => prepared.bind(v),
                Bind::Ids(v) => prepared.bind(v),
                Bind::Status(v) => prepared.bind(v),
                Bind::Type(v) => prepared.bind(v),
            };
        }

        let requests = prepared.fetch_all(&self.pool).await?;
        Ok(requests)
    }

    /// True when a row was actually removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
