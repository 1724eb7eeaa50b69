use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{admindtos::*, jobdtos::ApiResponse, userdtos::FilterUserDto},
    error::HttpError,
    extract::{AppJson, AppPath},
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/workers/pending", get(get_pending_workers))
        .route("/workers/:worker_id/review", put(review_worker))
        .route("/workers/:worker_id/block", put(block_worker))
        .route("/workers/:worker_id/reviews", get(get_worker_reviews))
        .route("/services/:service_id/price", put(update_service_price))
}

pub async fn get_pending_workers(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let workers = app_state.worker_service.pending_workers().await?;

    Ok(Json(ApiResponse::success(
        "Pending workers retrieved successfully",
        FilterUserDto::filter_users(&workers),
    )))
}

pub async fn review_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    AppPath(worker_id): AppPath<Uuid>,
    AppJson(body): AppJson<ReviewWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let worker = app_state.worker_service.review_worker(worker_id, body).await?;

    Ok(Json(ApiResponse::success(
        "Worker reviewed successfully",
        FilterUserDto::filter_user(&worker),
    )))
}

pub async fn block_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    AppPath(worker_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let worker = app_state.worker_service.block_worker(worker_id).await?;

    Ok(Json(ApiResponse::success(
        "Worker blocked successfully",
        FilterUserDto::filter_user(&worker),
    )))
}

pub async fn get_worker_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    AppPath(worker_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state.worker_service.worker_reviews(worker_id).await?;

    Ok(Json(ApiResponse::success("Worker reviews retrieved successfully", reviews)))
}

pub async fn update_service_price(
    Extension(app_state): Extension<Arc<AppState>>,
    AppPath(service_id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateServicePriceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let service = app_state
        .worker_service
        .update_service_price(service_id, body.into())
        .await?;

    Ok(Json(ApiResponse::success("Service price updated successfully", service)))
}
