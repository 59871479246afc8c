use actix_web::{HttpResponse, web};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeaveStatus, LeaveType};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{LeaveService, StatsRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub actor_id: Uuid,
    pub year: Option<i32>,
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<String>,
    pub leave_type: Option<String>,
}

/// Aggregate leave statistics for the requested year, scoped to what the
/// acting employee is allowed to see
pub async fn leave_stats(
    service: web::Data<LeaveService>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<LeaveStatus>())
        .transpose()
        .map_err(AppError::Validation)?;
    let leave_type = query
        .leave_type
        .as_deref()
        .map(|s| s.parse::<LeaveType>())
        .transpose()
        .map_err(AppError::Validation)?;

    let request = StatsRequest {
        year: query.year.unwrap_or_else(|| Utc::now().year()),
        employee_id: query.employee_id,
        department_id: query.department_id,
        status,
        leave_type,
    };

    let report = service.stats(query.actor_id, &request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
