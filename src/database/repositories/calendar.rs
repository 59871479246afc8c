use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{ExceptionDay, ExceptionDayInput};

#[derive(Clone)]
pub struct CalendarRepository {
    pool: PgPool,
}

impl CalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: ExceptionDayInput) -> Result<ExceptionDay> {
        let span = sqlx::query_as::<_, ExceptionDay>(
            r#"
            INSERT INTO calendar_exceptions (id, kind, start_date, end_date, label, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, kind, start_date, end_date, label, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.kind)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.label)
        .fetch_one(&self.pool)
        .await?;

        Ok(span)
    }

    /// Exception spans intersecting `[start, end]`. The fetch is scoped to
    /// the window; callers clip spans to it when building an index.
    pub async fn spans_intersecting(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExceptionDay>> {
        let spans = sqlx::query_as::<_, ExceptionDay>(
            r#"
            SELECT id, kind, start_date, end_date, label, created_at
            FROM calendar_exceptions
            WHERE start_date <= $2 AND end_date >= $1
            ORDER BY start_date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(spans)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM calendar_exceptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
