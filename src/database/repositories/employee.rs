use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Employee, EmployeeRole};

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, name, email, role, department_id, created_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Current head set of one department; snapshotted onto a request at
    /// submission time.
    pub async fn department_heads(&self, department_id: Uuid) -> Result<Vec<Uuid>> {
        let heads = sqlx::query_scalar::<_, Uuid>(
            "SELECT employee_id FROM department_heads WHERE department_id = $1",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(heads)
    }

    /// Departments a head manages; drives department-head stats visibility.
    pub async fn managed_departments(&self, employee_id: Uuid) -> Result<Vec<Uuid>> {
        let departments = sqlx::query_scalar::<_, Uuid>(
            "SELECT department_id FROM department_heads WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    pub async fn employees_in_departments(&self, department_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let employees = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM employees WHERE department_id = ANY($1)",
        )
        .bind(department_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn admins(&self) -> Result<Vec<Employee>> {
        let admins = sqlx::query_as::<_, Employee>(
            "SELECT id, name, email, role, department_id, created_at FROM employees WHERE role = $1",
        )
        .bind(EmployeeRole::Admin)
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }
}
