//! Route protection driven by the `session_token` cookie.
//!
//! Every request is classified by path. Protected routes need a token that
//! verifies *and* a live session row for it; public sign-in/sign-up routes
//! bounce already-authenticated visitors to the dashboard. Any failure while
//! resolving the session (bad token, missing row, unreachable store) is
//! treated as "not signed in".

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{
    cookie::{session_cookie_removal, SESSION_COOKIE},
    extractors::CurrentSession,
};
use crate::state::AppState;

pub const SIGN_IN_PAGE: &str = "/signin";
pub const DASHBOARD_PAGE: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    PublicAuth,
    Open,
    Protected,
}

pub fn classify(path: &str) -> RouteClass {
    match path.trim_end_matches('/') {
        "/signin" | "/signup" | "/auth/signin" | "/auth/signup" => RouteClass::PublicAuth,
        "/health" => RouteClass::Open,
        _ => RouteClass::Protected,
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Resolves the identity behind a token: signature first, then the session
/// row. Store errors count as "no session".
pub async fn resolve_session(state: &AppState, token: &str) -> Option<CurrentSession> {
    let user_id = state.tokens.verify(token)?;
    let now = OffsetDateTime::now_utc();
    match state.sessions.find_active(token, user_id, now).await {
        Ok(Some(session)) if session.is_active(now) => Some(CurrentSession {
            user_id: session.user_id,
            token: session.token,
        }),
        Ok(_) => {
            debug!(%user_id, "no active session for token");
            None
        }
        Err(e) => {
            warn!(error = %e, %user_id, "session lookup failed; treating as signed out");
            None
        }
    }
}

pub async fn session_gateway(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let class = classify(req.uri().path());
    if class == RouteClass::Open {
        return next.run(req).await;
    }

    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty());

    match (class, token) {
        (RouteClass::PublicAuth, None) => next.run(req).await,
        (RouteClass::PublicAuth, Some(token)) => {
            if resolve_session(&state, &token).await.is_some() {
                Redirect::to(DASHBOARD_PAGE).into_response()
            } else {
                // Stale cookie: let them sign in again.
                next.run(req).await
            }
        }
        (_, None) => reject(jar, wants_html(req.headers())),
        (_, Some(token)) => match resolve_session(&state, &token).await {
            Some(session) => {
                req.extensions_mut().insert(session);
                next.run(req).await
            }
            None => {
                // Lazy cleanup of the row the cookie pointed at, if any.
                if let Err(e) = state.sessions.delete_by_token(&token).await {
                    warn!(error = %e, "failed to purge rejected session");
                }
                reject(jar, wants_html(req.headers()))
            }
        },
    }
}

fn reject(jar: CookieJar, html: bool) -> Response {
    let jar = jar.remove(session_cookie_removal());
    if html {
        (jar, Redirect::to(SIGN_IN_PAGE)).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            jar,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response()
    }
}
