//! Page routes and the administrator login flow.

use super::error::{ApiError, ApiReply};
use super::AppState;
use crate::views::{self, Page};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use tracing::info;
use wadash_auth::LoginRequest;

/// `GET /`: dashboard, or back to the login page.
pub(super) async fn dashboard(State(state): State<AppState>) -> Response {
    if !state.gate.is_logged_in() {
        return Redirect::to("/login").into_response();
    }
    views::render(&state.views_dir, Page::Dashboard)
        .await
        .into_response()
}

/// `GET /login`: login page, or straight to the dashboard.
pub(super) async fn login_page(State(state): State<AppState>) -> Response {
    if state.gate.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    views::render(&state.views_dir, Page::Login)
        .await
        .into_response()
}

/// `POST /login`: check credentials and open the session.
pub(super) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiReply, ApiError> {
    let Json(request) = body?;
    let username = state.verifier.verify(&request).await?;
    state.gate.login();
    info!("administrator '{username}' logged in");
    Ok(ApiReply::ok("success", "Successfully login"))
}

/// `GET /login/process`: where the login page lands after a successful
/// `POST /login`.
pub(super) async fn login_process(State(state): State<AppState>) -> Redirect {
    if state.gate.is_logged_in() {
        Redirect::to("/")
    } else {
        Redirect::to("/login")
    }
}

/// `GET /logout`: close the session.
pub(super) async fn logout(State(state): State<AppState>) -> Redirect {
    state.gate.logout();
    info!("administrator logged out");
    Redirect::to("/login")
}

/// Anything no route or static file matched.
pub(super) async fn not_found(State(state): State<AppState>) -> Response {
    (
        StatusCode::NOT_FOUND,
        views::render(&state.views_dir, Page::NotFound).await,
    )
        .into_response()
}
