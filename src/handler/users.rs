use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    dtos::{jobdtos::ApiResponse, userdtos::*},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new().route("/me", get(get_me))
}

pub fn services_handler() -> Router {
    Router::new().route("/", get(list_services))
}

pub async fn get_me(
    Extension(_app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let response = UserResponseDto {
        success: true,
        data: UserData {
            user: FilterUserDto::filter_user(&auth.user),
        },
    };

    Ok(Json(response))
}

pub async fn list_services(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let services = app_state.worker_service.services().await?;

    Ok(Json(ApiResponse::success("Services retrieved successfully", services)))
}
