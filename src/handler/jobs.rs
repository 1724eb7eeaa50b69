use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::jobdtos::*,
    error::HttpError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        // Client routes
        .route(
            "/jobs/create",
            post(create_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Client])
            })),
        )
        .route(
            "/jobs",
            get(get_client_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Client])
            })),
        )
        .route(
            "/jobs/:job_id/rate",
            post(rate_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Client])
            })),
        )
        .route(
            "/jobs/:job_id/cancel",
            delete(cancel_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Client, UserRole::Admin])
            })),
        )
        // Worker routes
        .route(
            "/jobs/:job_id/receive",
            post(receive_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/jobs/:job_id",
            put(update_job_status).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker, UserRole::Admin])
            })),
        )
        .route(
            "/jobs/history",
            get(get_job_history).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/worker_jobs",
            get(get_worker_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        .route(
            "/worker/dashboard",
            get(get_worker_dashboard).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Worker])
            })),
        )
        // Shared
        .route("/jobs/:job_id/details", get(get_job_details))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppJson(body): AppJson<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created successfully", job)),
    ))
}

pub async fn get_client_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppQuery(params): AppQuery<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (jobs, total) = app_state
        .job_service
        .client_jobs(auth.user.id, &params)
        .await?;

    Ok(Json(PaginatedResponse::new(jobs, total, params.page(), params.limit())))
}

pub async fn get_job_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let details = app_state.job_service.job_details(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", details)))
}

pub async fn receive_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.claim_job(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Job accepted successfully", job)))
}

pub async fn update_job_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppPath(job_id): AppPath<Uuid>,
    AppJson(body): AppJson<AdvanceJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .advance_job(&auth.user, job_id, body.status)
        .await?;

    Ok(Json(ApiResponse::success("Job status updated successfully", job)))
}

pub async fn cancel_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppPath(job_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.cancel_job(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Job cancelled successfully", job)))
}

pub async fn rate_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppPath(job_id): AppPath<Uuid>,
    AppJson(body): AppJson<RateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .rate_job(&auth.user, job_id, body.into())
        .await?;

    Ok(Json(ApiResponse::success("Job rated successfully", job)))
}

pub async fn get_worker_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppQuery(params): AppQuery<WorkerJobsQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let paging = params.paging();
    let (jobs, total) = app_state
        .job_service
        .worker_jobs(&auth.user, params.status, &paging)
        .await?;

    Ok(Json(PaginatedResponse::new(jobs, total, paging.page(), paging.limit())))
}

pub async fn get_job_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    AppQuery(params): AppQuery<HistoryQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.worker_history(&auth.user, &params).await?;

    Ok(Json(ApiResponse::success("Job history retrieved successfully", jobs)))
}

pub async fn get_worker_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let dashboard = app_state.stats_service.worker_dashboard(auth.user.id).await?;

    Ok(Json(ApiResponse::success("Dashboard retrieved successfully", dashboard)))
}
