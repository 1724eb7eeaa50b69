use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::*,
    error::{ErrorMessage, HttpError},
    extract::AppJson,
    models::usermodel::User,
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register/client", post(register_client))
        .route("/register/worker", post(register_worker))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn issue_token(app_state: &AppState, user: &User) -> Result<String, HttpError> {
    token::create_token(
        &user.id.to_string(),
        user.role,
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))
}

fn with_token_cookie(response: impl IntoResponse, token: String, max_age_minutes: i64) -> Result<axum::response::Response, HttpError> {
    let cookie = Cookie::build(("token", token))
        .path("/")
        .max_age(time::Duration::minutes(max_age_minutes))
        .http_only(true)
        .build();

    let cookie_header = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut response = response.into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie_header);
    Ok(response)
}

pub async fn register_client(
    Extension(app_state): Extension<Arc<AppState>>,
    AppJson(body): AppJson<RegisterClientDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state.worker_service.register_client(body).await?;
    let token = issue_token(&app_state, &user)?;

    let response = (
        StatusCode::CREATED,
        Json(RegisterResponseDto {
            success: true,
            token: token.clone(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    );

    with_token_cookie(response, token, app_state.env.jwt_maxage)
}

pub async fn register_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    AppJson(body): AppJson<RegisterWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state.worker_service.register_worker(body).await?;
    let token = issue_token(&app_state, &user)?;

    let response = (
        StatusCode::CREATED,
        Json(RegisterResponseDto {
            success: true,
            token: token.clone(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    );

    with_token_cookie(response, token, app_state.env.jwt_maxage)
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    AppJson(body): AppJson<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user_by_email(&body.email)
        .await
        .map_err(|e| {
            tracing::error!("login lookup failed: {}", e);
            HttpError::persistence_error("Could not look up the account")
        })?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    let token = issue_token(&app_state, &user)?;
    tracing::info!("user {} logged in", user.id);

    let response = Json(UserLoginResponseDto {
        success: true,
        token: token.clone(),
        role: user.role,
    });

    with_token_cookie(response, token, app_state.env.jwt_maxage)
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let response = Json(serde_json::json!({
        "success": true,
        "message": "Logged out"
    }));

    with_token_cookie(response, String::new(), 0)
}
