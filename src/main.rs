//! ReviewLens gateway binary.
//!
//! Wires configuration, the review source, the report store, and the
//! orchestrator into one axum server with rate limiting, request logging,
//! CORS, and Prometheus metrics.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::time::interval;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tower_http::cors::{Any, CorsLayer};

use reviewlens_backend::api::{routes, AppState};
use reviewlens_backend::middleware::rate_limit::rate_limit_middleware;
use reviewlens_backend::middleware::{request_logging, RateLimiter, RateLimiterConfig};
use reviewlens_backend::models::Config;
use reviewlens_backend::nlp::NlpConfig;
use reviewlens_backend::orchestrator::Orchestrator;
use reviewlens_backend::sources::{HttpReviewSource, MockReviewSource, ReviewSource};
use reviewlens_backend::store::{HttpReportStore, ReportStore, SqliteReportStore};

#[derive(Parser, Debug)]
#[command(name = "reviewlens", about = "Review trust analysis gateway")]
struct Args {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Report database path (overrides DB_PATH).
    #[arg(long)]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    info!("🚀 ReviewLens gateway starting");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    // Review source: remote scraper when configured, seeded mock otherwise.
    let source: Arc<dyn ReviewSource> = match &config.scraper_url {
        Some(url) => {
            info!(scraper_url = %url, "using HTTP review source");
            Arc::new(HttpReviewSource::new(url.clone())?)
        }
        None => {
            warn!("SCRAPER_URL not set, using mock review source");
            Arc::new(MockReviewSource::default())
        }
    };

    // Report store: remote service when configured, local sqlite otherwise.
    let store: Arc<dyn ReportStore> = match &config.report_store_url {
        Some(url) => {
            info!(report_store_url = %url, "using HTTP report store");
            Arc::new(HttpReportStore::new(url.clone())?)
        }
        None => {
            let store = SqliteReportStore::new(&config.db_path)?;
            info!(db_path = %config.db_path, entries = store.len(), "using sqlite report store");
            Arc::new(store)
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(
        source,
        store.clone(),
        Arc::new(NlpConfig::default()),
        &config,
    ));

    let limiter = RateLimiter::new(RateLimiterConfig {
        max_requests: config.rate_limit_requests,
        window: Duration::from_secs(config.rate_limit_window_secs),
    });

    // Background: evict expired cache entries and idle rate-limit buckets.
    {
        let store = store.clone();
        let limiter = limiter.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(3600));
            loop {
                ticker.tick().await;
                limiter.cleanup();
                match store.sweep().await {
                    Ok(0) => {}
                    Ok(swept) => info!(swept, "🧹 swept expired cache entries"),
                    Err(e) => warn!(error = %e, "cache sweep failed"),
                }
            }
        });
    }

    let app_state = AppState {
        config: config.clone(),
        orchestrator,
        metrics_handle,
    };

    let analyze_routes = Router::new()
        .route("/analyze", post(routes::analyze))
        .route_layer(axum_mw::from_fn_with_state(
            limiter.clone(),
            rate_limit_middleware,
        ));

    let app = Router::new()
        .merge(analyze_routes)
        .route("/", get(routes::service_descriptor))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route("/cache/stats", get(routes::cache_stats))
        .route("/cache/invalidate", post(routes::cache_invalidate))
        .with_state(app_state)
        .layer(axum_mw::from_fn(request_logging))
        .layer(cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "✅ gateway listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if config.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Initialize tracing with env-filter overrides.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewlens_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
