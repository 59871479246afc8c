use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::ExceptionDayInput;
use crate::database::repositories::CalendarRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionWindowQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Register a holiday or weekend span on the company calendar
pub async fn create_exception(
    repository: web::Data<CalendarRepository>,
    input: web::Json<ExceptionDayInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    if input.start_date > input.end_date {
        return Err(AppError::Validation(
            "start date cannot be after end date".to_string(),
        ));
    }

    let created = repository.create(input).await.map_err(AppError::from)?;
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// List the exception spans intersecting a date window
pub async fn list_exceptions(
    repository: web::Data<CalendarRepository>,
    query: web::Query<ExceptionWindowQuery>,
) -> Result<HttpResponse, AppError> {
    if query.start_date > query.end_date {
        return Err(AppError::Validation(
            "start date cannot be after end date".to_string(),
        ));
    }

    let exceptions = repository
        .spans_intersecting(query.start_date, query.end_date)
        .await
        .map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(exceptions)))
}

/// Remove an exception span from the calendar
pub async fn delete_exception(
    repository: web::Data<CalendarRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let removed = repository
        .delete(path.into_inner())
        .await
        .map_err(AppError::from)?;
    if !removed {
        return Err(AppError::NotFound("calendar exception not found".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}
