use std::time::{Duration, Instant};

use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

/// Cadence of the rate-limit record sweep
const REAPER_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(config).expect("Failed to initialize application state");

    // Reap expired rate-limit windows so memory stays bounded under many
    // distinct client ids
    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let grace = limiter.window();
        let mut interval = tokio::time::interval(REAPER_INTERVAL);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            limiter.sweep_expired(Instant::now(), grace);
        }
    });

    let state = web::Data::new(state);

    tracing::info!("Starting facilitator agent server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::analysis::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
