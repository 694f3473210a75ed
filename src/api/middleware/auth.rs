use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// The session token from the `session` cookie, or else from `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

async fn resolve_user(state: &AppState, token: Option<String>) -> Result<User, AppError> {
    let token = token.ok_or(AppError::Unauthorized)?;

    state
        .service_context
        .user_service
        .authenticate(&token)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, &request);
    let user = resolve_user(&state, token).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Admin, super admin, and manager accounts.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, &request);
    let user = resolve_user(&state, token).await?;

    if !user.can_manage_platform() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}
