//! HTTP boundary for the artifact store.
//!
//! Translates requests into service calls and [`Error`](crate::error::Error)
//! values into status codes. No business rule lives here.

mod auth;
mod error;
mod projects;
mod users;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::{SessionTokens, TokenVerifier};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{Metrics, Timer};
use crate::service::{ArtifactService, UserService};
use crate::store::{FsBlobStore, JsonProjectStore, JsonUserDirectory, UserDirectory};

pub use auth::{bearer_token, Caller};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<ArtifactService>,
    pub users: Arc<UserService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub metrics: Arc<Metrics>,
    sessions: Arc<SessionTokens>,
}

impl AppState {
    /// Open the stores under the configured data directory and wire the services.
    pub async fn open(config: &Config) -> Result<Self> {
        let directory: Arc<dyn UserDirectory> =
            Arc::new(JsonUserDirectory::new(&config.data_dir).await?);
        let projects = Arc::new(JsonProjectStore::new(&config.data_dir, directory.clone()).await?);
        let blobs = Arc::new(FsBlobStore::new(config.blob_root()).await?);
        let sessions = Arc::new(SessionTokens::new(config.token_ttl()));
        let metrics = Metrics::new();

        let artifacts = ArtifactService::new(
            projects,
            blobs,
            directory.clone(),
            metrics.clone(),
            config.artifact_options(),
        );

        Ok(Self {
            artifacts: Arc::new(artifacts),
            users: Arc::new(UserService::new(directory, sessions.clone())),
            tokens: sessions.clone(),
            metrics,
            sessions,
        })
    }

    /// Periodically drop expired sessions for the lifetime of the runtime.
    pub fn spawn_session_purge(&self, every: Duration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = sessions.purge_expired();
                if purged > 0 {
                    debug!(
                        "Purged {} expired sessions, {} remain",
                        purged,
                        sessions.session_count()
                    );
                }
            }
        })
    }
}

/// Build the application router.
pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/projects/upload", post(projects::upload))
        .route("/projects/{id}", get(projects::get_project))
        .route("/projects/{id}/data", patch(projects::update_data))
        .route(
            "/projects/{id}/files",
            get(projects::download).patch(projects::update_files),
        )
        .route("/users", post(users::register).get(users::list))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .layer(DefaultBodyLimit::max(config.max_archive_bytes))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(config: &Config, state: AppState) -> Result<()> {
    let app = router(state, config);

    let addr = config.bind_addr();
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn track_requests(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let timer = Timer::start();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    metrics.record_request(status.is_success());
    debug!(
        "{} {} -> {} in {}ms",
        method,
        path,
        status.as_u16(),
        timer.elapsed_ms()
    );
    response
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
