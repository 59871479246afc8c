use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Notification;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        recipient_id: Uuid,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, kind, title, body, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, recipient_id, kind, title, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, kind, title, body, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
