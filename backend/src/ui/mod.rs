// Embedded single-page dashboard.

use axum::response::{Html, IntoResponse};

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

pub async fn dashboard() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
