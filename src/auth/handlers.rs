use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use super::{
    cookie::{session_cookie, session_cookie_removal},
    dto::{MeResponse, SignInRequest, SignInResponse, SignOutResponse, SignUpRequest, SignUpResponse},
    extractors::{AuthUser, CurrentSession},
    services,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SignUpResponse>)> {
    let Json(body) = payload?;
    let account = services::validate_sign_up(body)?;
    let user = services::register(&state, account).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            success: true,
            message: "User created successfully",
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<SignInResponse>)> {
    let Json(body) = payload?;
    let (user, issued) = services::sign_in(&state, body).await?;
    let cookie = session_cookie(issued.token, state.tokens.ttl(), state.config.secure_cookies);
    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            success: true,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, jar, session), fields(user_id = %session.user_id))]
pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: CurrentSession,
) -> (CookieJar, Json<SignOutResponse>) {
    // The cookie is cleared even when the row cannot be removed now.
    if let Err(e) = state.sessions.delete_by_token(&session.token).await {
        warn!(error = %e, "failed to delete session on sign-out");
    }
    info!("user signed out");
    (
        jar.remove(session_cookie_removal()),
        Json(SignOutResponse {
            success: true,
            message: "Signed out successfully",
        }),
    )
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<MeResponse>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    Ok(Json(MeResponse { user: user.into() }))
}
