use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;

use crate::{dtos::jobdtos::ApiResponse, error::HttpError, AppState};

pub fn stats_handler() -> Router {
    Router::new()
        .route("/revenue/monthly", get(get_monthly_revenue))
        .route("/revenue/total", get(get_total_revenue))
        .route("/revenue/services", get(get_revenue_by_service))
        .route("/services/most-booked", get(get_most_booked_services))
        .route("/workers/rankings", get(get_worker_rankings))
        .route("/clients/top", get(get_top_clients))
}

pub async fn get_monthly_revenue(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = app_state.stats_service.monthly_revenue().await?;
    Ok(Json(ApiResponse::success("Monthly revenue retrieved successfully", rows)))
}

pub async fn get_total_revenue(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let total = app_state.stats_service.total_revenue().await?;
    Ok(Json(ApiResponse::success(
        "Total revenue retrieved successfully",
        json!({ "total_revenue": total }),
    )))
}

pub async fn get_revenue_by_service(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = app_state.stats_service.revenue_by_service().await?;
    Ok(Json(ApiResponse::success("Revenue by service retrieved successfully", rows)))
}

pub async fn get_most_booked_services(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = app_state.stats_service.most_booked_services().await?;
    Ok(Json(ApiResponse::success("Most booked services retrieved successfully", rows)))
}

pub async fn get_worker_rankings(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = app_state.stats_service.worker_rankings().await?;
    Ok(Json(ApiResponse::success("Worker rankings retrieved successfully", rows)))
}

pub async fn get_top_clients(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = app_state.stats_service.top_clients().await?;
    Ok(Json(ApiResponse::success("Top clients retrieved successfully", rows)))
}
