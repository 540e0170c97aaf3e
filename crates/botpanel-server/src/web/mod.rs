//! HTTP surface of the panel.

pub mod handlers;
pub mod notice;
pub mod pages;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use botpanel_core::PanelConfig;

use crate::auth::SessionTokens;
use crate::namespace::UserNamespace;
use crate::storage::PanelDatabase;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub db: PanelDatabase,
    pub tokens: Arc<SessionTokens>,
    pub config: Arc<PanelConfig>,
}

impl AppState {
    pub fn new(db: PanelDatabase, config: PanelConfig) -> Self {
        let tokens = SessionTokens::new(
            config.session.secret.as_bytes(),
            config.session.ttl_secs,
            config.session.remember_ttl_secs,
        );
        Self {
            db,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }

    pub fn user_data_path(&self) -> PathBuf {
        self.config.user_data_path()
    }

    pub fn namespace(&self, user_id: i64) -> UserNamespace {
        UserNamespace::new(&self.user_data_path(), user_id)
    }
}

/// Build the router with every panel route.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::home))
        .route("/home", get(handlers::home))
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register_submit),
        )
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
        .route(
            "/dashboard",
            get(handlers::dashboard)
                .post(handlers::dashboard_upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/bot/start", get(handlers::start_bot))
        .route("/bot/stop", get(handlers::stop_bot))
        .route("/admin", get(handlers::admin_panel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
