//! Application startup and lifecycle management.

use crate::config::PricingConfig;
use crate::handlers::{lines, scenario};
use crate::services::{
    get_metrics, init_metrics, FileRuleRepository, InMemoryRuleRepository, RuleRepository,
    ScenarioController,
};
use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PricingConfig,
    pub controller: Arc<Mutex<ScenarioController>>,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "pricing-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = get_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PricingConfig) -> Result<Self, AppError> {
        init_metrics();

        let repository: Box<dyn RuleRepository> = match &config.rules.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using file-backed default rules");
                Box::new(FileRuleRepository::new(path.clone()))
            }
            None => {
                tracing::info!("Using in-memory default rules");
                Box::new(InMemoryRuleRepository::default())
            }
        };

        let controller = ScenarioController::new(repository, Vec::new()).map_err(|e| {
            tracing::error!(error = %e, "Failed to load default rules");
            AppError::StorageError(anyhow::Error::new(e))
        })?;

        let state = AppState {
            config: config.clone(),
            controller: Arc::new(Mutex::new(controller)),
        };

        // Port 0 binds a random port for testing
        let http_addr = config.common.http_addr();
        let http_listener = TcpListener::bind(&http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Pricing service listener bound");

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "pricing-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.http_listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/lines",
            get(lines::get_active_lines).put(lines::load_lines),
        )
        .route("/scenario", get(scenario::get_scenario))
        .route("/scenario/preview", get(scenario::get_preview))
        .route(
            "/scenario/rules",
            get(scenario::get_rules).post(scenario::add_rule),
        )
        .route(
            "/scenario/rules/:rule_id",
            patch(scenario::edit_rule).delete(scenario::remove_rule),
        )
        .route("/scenario/apply", post(scenario::apply))
        .route("/scenario/reset", post(scenario::reset))
        .route("/scenario/promote", post(scenario::promote));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
