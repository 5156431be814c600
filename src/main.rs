mod api; // HTTP surface: multipart intake + JSON envelope
mod config;
mod models;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use api::create_router;
use config::Config;
use services::{EstimationService, FoodEstimator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Vision Proxy...");

    let config = Config::from_env()?;

    let service = EstimationService::new(&config)?;
    if service.is_configured() {
        log::info!(
            "✅ Food vision provider configured (timeout {:?} per attempt)",
            config.provider_timeout
        );
    } else {
        log::warn!("⚠️ FOOD_VISION_URL not set, estimate requests will fail with 500");
    }
    if config.api_key.is_none() {
        log::warn!("⚠️ FOOD_VISION_API_KEY not set, provider calls are unauthenticated");
    }

    let estimator = Arc::new(service) as Arc<dyn FoodEstimator>;
    let app = create_router(estimator, config.max_image_bytes, config.include_raw);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Listening on {}", config.bind_addr);
    log::info!("📸 POST images to http://{}/api/food/estimate", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
    }
    log::info!("🛑 Shutting down...");
}
