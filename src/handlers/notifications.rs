use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::database::repositories::NotificationRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

/// List stored notifications for an employee, newest first
pub async fn list_notifications(
    repository: web::Data<NotificationRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let notifications = repository
        .list_for(path.into_inner())
        .await
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(notifications)))
}
