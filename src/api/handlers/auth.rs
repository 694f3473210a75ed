use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{AuthService, SESSION_COOKIE},
    domain::{CreateUserRequest, User},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
    /// Also usable as `Authorization: Bearer <token>`.
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.service_context.user_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let (user, token) = state
        .service_context
        .user_service
        .login(&request.email, &request.password)
        .await?;

    let secure = state.settings.server.base_url.starts_with("https://");
    let cookie = state
        .service_context
        .auth_service
        .create_session_cookie(&token, secure);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
            token,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        state
            .service_context
            .user_service
            .logout(session_cookie.value())
            .await?;
    }

    Ok((jar.add(AuthService::create_logout_cookie()), StatusCode::NO_CONTENT))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}
