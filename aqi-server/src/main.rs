use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use aqi_server::cache::FeedCache;
use aqi_server::config::AppConfig;
use aqi_server::service::AqiService;
use aqi_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aqi_server=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config = AppConfig::from_env();

    let feed = config.feed_backend().context("failed to create feed client")?;
    let geocoder = config
        .geocoder_backend()
        .context("failed to create geocoder")?;
    let narrator = config
        .narrator_backend()
        .context("failed to create narrator")?;

    match &config.feed_file {
        Some(path) => info!(path = %path.display(), "serving saved feed"),
        None => info!(url = %config.feed_url, "serving live feed"),
    }
    info!(
        geocoder = config.geocoder_enabled,
        generative_narrator = config.gemini_api_key.is_some(),
        ttl_secs = config.cache_ttl.as_secs(),
        stale_policy = ?config.stale_policy,
        "configured"
    );

    let cache = FeedCache::new(feed, &config.cache_config());
    let service = AqiService::new(cache, geocoder, narrator, config.service_config());
    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "AQI server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
