//! Minimal HTML shells for the pages the session gateway redirects between.
//! They carry no forms; the client posts JSON to the endpoint named in
//! `data-endpoint`.

use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} | LaundryPro</title></head>\n<body>{body}</body>\n</html>\n"
    ))
}

async fn signin_page() -> Html<String> {
    shell(
        "Sign in",
        r#"<h1>Sign in</h1><div id="signin" data-endpoint="/auth/signin"></div>"#,
    )
}

async fn signup_page() -> Html<String> {
    shell(
        "Sign up",
        r#"<h1>Create account</h1><div id="signup" data-endpoint="/auth/signup"></div>"#,
    )
}

async fn dashboard_page() -> Html<String> {
    shell(
        "Dashboard",
        r#"<h1>Dashboard</h1><div id="stats" data-source="/dashboard-stats"></div>"#,
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(signin_page))
        .route("/signup", get(signup_page))
        .route("/dashboard", get(dashboard_page))
}
