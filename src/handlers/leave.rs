use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{
    DecisionInput, LeaveRequestInput, LeaveRequestPatch, LeaveStatus, LeaveType,
};
use crate::database::repositories::LeaveQuery;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::LeaveService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeptHeadDecisionRequest {
    pub dept_head_id: Uuid,
    #[serde(flatten)]
    pub decision: DecisionInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDecisionRequest {
    pub admin_id: Uuid,
    #[serde(flatten)]
    pub decision: DecisionInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    pub employee_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<String>,
    pub leave_type: Option<String>,
}

impl LeaveListQuery {
    fn to_query(&self) -> Result<LeaveQuery, AppError> {
        let status = self
            .status
            .as_deref()
            .map(|s| s.parse::<LeaveStatus>())
            .transpose()
            .map_err(AppError::Validation)?;
        let leave_type = self
            .leave_type
            .as_deref()
            .map(|s| s.parse::<LeaveType>())
            .transpose()
            .map_err(AppError::Validation)?;

        Ok(LeaveQuery {
            employee_ids: self.employee_id.map(|id| vec![id]),
            department_id: self.department_id,
            status,
            leave_type,
        })
    }
}

/// Submit a new leave request
pub async fn submit_leave_request(
    service: web::Data<LeaveService>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = service.submit(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// Get a specific leave request by ID
pub async fn get_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// List leave requests with optional filtering
pub async fn list_leave_requests(
    service: web::Data<LeaveService>,
    query: web::Query<LeaveListQuery>,
) -> Result<HttpResponse, AppError> {
    let requests = service.list(&query.to_query()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Record the department head's ruling on a pending request
pub async fn dept_head_decision(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<DeptHeadDecisionRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let request = service
        .dept_head_decision(path.into_inner(), input.dept_head_id, input.decision)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Record the admin's ruling on a request the department head passed along
pub async fn admin_decision(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<AdminDecisionRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let request = service
        .admin_decision(path.into_inner(), input.admin_id, input.decision)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Apply a sparse edit to a non-terminal request
pub async fn update_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    patch: web::Json<LeaveRequestPatch>,
) -> Result<HttpResponse, AppError> {
    let request = service.update(path.into_inner(), patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Delete a leave request
pub async fn delete_leave_request(
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
