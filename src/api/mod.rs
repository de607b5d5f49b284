//! HTTP server: pages, login flow, WhatsApp admin actions, and the push
//! channel.

mod admin;
mod error;
mod pages;
mod socket;

#[cfg(test)]
mod tests;

pub use error::{ApiError, ApiReply};

use crate::pairing::PairingTracker;
use crate::session::SessionGate;
use axum::handler::Handler;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wadash_auth::CredentialVerifier;
use wadash_core::config::ServerConfig;
use wadash_core::event::AutomationEvent;
use wadash_core::traits::Automation;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SessionGate>,
    pub tracker: Arc<PairingTracker>,
    pub verifier: CredentialVerifier,
    pub automation: Arc<dyn Automation>,
    /// Handed to the automation client when it is re-initialized.
    pub events: mpsc::Sender<AutomationEvent>,
    pub views_dir: PathBuf,
    pub repair_after_logout: bool,
}

/// Build the router. Unmatched GETs are served from `public_dir`, then fall
/// through to the 404 page.
pub fn build_router(state: AppState, public_dir: &Path, cors_origin: &str) -> Router {
    let not_found = pages::not_found.with_state(state.clone());
    let assets = ServeDir::new(public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found);

    Router::new()
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/login/process", get(pages::login_process))
        .route("/logout", get(pages::logout))
        .route("/admin/whatsapp/send-message", post(admin::send_message))
        .route("/admin/whatsapp/logout", post(admin::logout))
        .route("/socket", get(socket::upgrade))
        .fallback_service(assets)
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            warn!("ignoring invalid cors_origin '{origin}': {e}");
            layer
        }
    }
}

/// Bind and serve until the listener fails.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let public_dir = config.public_dir();
    let app = build_router(state, &public_dir, &config.cors_origin);
    let addr = config.addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {addr}: {e}"))?;

    info!(
        "dashboard listening on http://{addr} (assets: {})",
        public_dir.display()
    );
    axum::serve(listener, app).await?;
    Ok(())
}
