//! Hearth Household API
//!
//! HTTP service for household access and billing.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/auth/nanny-token` - Issue a one-time caregiver code
//! - `POST /api/v1/auth/nanny-token/verify` - Exchange a code for a session
//! - `POST /api/v1/auth/child-login` - Child PIN login
//! - `POST /api/v1/auth/device-login` - Registered-device login
//! - `GET /api/v1/billing/entitlement` - Refresh and read the entitlement
//! - `POST /api/v1/billing/checkout` - Create a checkout session
//! - `POST /api/v1/billing/cancel` - Cancel and refund
//! - `POST /api/v1/billing/can-create` - Quota check
//! - `POST /internal/billing/sync-all` - Cron subscription sync
//! - `POST /internal/auth/purge-tokens` - Cron expired-token cleanup
//! - `POST /webhooks/stripe` - Stripe webhook handler
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("household_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hearth Household API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(http_port = config.http_port, "Configuration loaded");

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = hearth_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Wire services and application state
    let state = AppState::new(pool, config.clone());

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        // Auth routes
        .route("/auth/nanny-token", post(handlers::create_nanny_token))
        .route(
            "/auth/nanny-token/verify",
            post(handlers::verify_nanny_token),
        )
        .route("/auth/child-login", post(handlers::child_login))
        .route("/auth/device-login", post(handlers::device_login))
        // Billing routes
        .route("/billing/entitlement", get(handlers::get_entitlement))
        .route("/billing/checkout", post(handlers::create_checkout))
        .route("/billing/cancel", post(handlers::cancel_subscription))
        .route("/billing/can-create", post(handlers::can_create));

    // Internal cron routes (guarded by shared secret, not sessions)
    let internal_routes = Router::new()
        .route("/internal/billing/sync-all", post(handlers::sync_all))
        .route("/internal/auth/purge-tokens", post(handlers::purge_tokens));

    // Webhook route (separate - uses raw body, no JSON parsing)
    let webhook_routes = Router::new().route("/webhooks/stripe", post(handlers::stripe_webhook));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .merge(internal_routes)
        .merge(webhook_routes)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most operations complete in <100ms; Stripe round-trips dominate the tail
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("billing_operation_duration_seconds".to_string()),
            latency_buckets,
        )?;

    let handle = builder.install_recorder()?;

    metrics::describe_counter!(
        "auth_nanny_tokens_issued_total",
        "Total one-time caregiver codes issued"
    );
    metrics::describe_counter!(
        "auth_nanny_tokens_verified_total",
        "Total one-time caregiver codes verified"
    );
    metrics::describe_counter!("auth_child_logins_total", "Total child logins by method");
    metrics::describe_counter!(
        "auth_nanny_tokens_purged_total",
        "Total expired nanny tokens deleted by the cleanup cron"
    );
    metrics::describe_counter!(
        "billing_checkouts_created_total",
        "Total checkout sessions created"
    );
    metrics::describe_counter!(
        "billing_subscriptions_canceled_total",
        "Total subscriptions canceled"
    );
    metrics::describe_counter!(
        "billing_webhooks_processed_total",
        "Total webhooks processed by status"
    );
    metrics::describe_counter!(
        "billing_sync_batch_households_total",
        "Households processed by the sync cron, by status"
    );
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
    metrics::describe_histogram!(
        "billing_operation_duration_seconds",
        "Billing operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
