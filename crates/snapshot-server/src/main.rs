mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use snapshot_api::state::{AppState, AppStateInner};
use snapshot_api::{events, users};
use snapshot_core::clock::{Clock, SystemClock};
use snapshot_core::commands::Commands;
use snapshot_core::delivery::{CardDelivery, DeliveryGateway, HtmlCardRenderer, WebhookSink};
use snapshot_core::ingest::Ingestor;
use snapshot_core::prompts::MoodPrompts;
use snapshot_core::scheduler::{RecapConfig, RecapScheduler};
use snapshot_types::models::Theme;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snapshot_server=debug,snapshot_api=debug,snapshot_core=debug,\
                 snapshot_db=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Store lifecycle is owned here; every component gets a handle
    let db = Arc::new(snapshot_db::Database::open(&config.db_path)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let renderer = HtmlCardRenderer::new(&config.static_dir);
    for theme in Theme::ALL {
        let path = renderer.stylesheet_path(theme);
        if !path.exists() {
            warn!(
                "No stylesheet for theme '{}' at {}; renders with it will fail",
                theme,
                path.display()
            );
        }
    }
    let sink = WebhookSink::new(&config.delivery_url, config.delivery_timeout)?;
    let gateway: Arc<dyn DeliveryGateway> = Arc::new(CardDelivery::new(renderer, sink));

    let scheduler = RecapScheduler::new(
        db.clone(),
        clock.clone(),
        gateway.clone(),
        RecapConfig {
            recap_hour: config.recap_hour,
            poll_interval: config.poll_interval,
            concurrency: config.delivery_concurrency,
            ..RecapConfig::default()
        },
    )
    .await?;
    let scheduler_task = tokio::spawn(scheduler.run());
    info!(
        "Daily recap scheduled for {:02}:00 UTC (polling every {}s)",
        config.recap_hour,
        config.poll_interval.as_secs()
    );

    let state: AppState = Arc::new(AppStateInner {
        ingestor: Ingestor::new(db.clone(), clock.clone()),
        commands: Commands::new(db, clock, gateway, MoodPrompts::new(), config.mood_timeout),
        ingest_token: config.ingest_token.clone(),
    });

    // Routes
    let protected_routes = Router::new()
        .route("/events/message", post(events::message))
        .route("/events/reaction", post(events::reaction))
        .route("/users/{user_id}/mood", post(users::set_mood))
        .route("/users/{user_id}/note", put(users::set_note))
        .route("/users/{user_id}/theme", get(users::get_theme).put(users::set_theme))
        .route("/users/{user_id}/snapshot", post(users::snapshot_now))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            snapshot_api::middleware::require_token,
        ))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Snapshot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler_task.abort();
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
