//! Backend entry-point: loads settings, connects stores, and serves the API.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::token_config::{BuildMode, token_settings_from_env};
use backend::outbound::cache::build_redis_pool;
use backend::outbound::onchain::IndexerEndpoints;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use backend::outbound::search::search_index_from_settings;
use backend::settings::AppSettings;
use server::{DelegationConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid token configuration")?;
    info!(
        fingerprint = %tokens.secret_fingerprint(),
        "token signing secret loaded"
    );

    let bind_addr: SocketAddr = settings
        .bind_address()
        .parse()
        .wrap_err_with(|| format!("invalid bind address {}", settings.bind_address()))?;
    let default_network = settings.default_network();
    let delegation = DelegationConfig::new(
        settings.enable_blockchain,
        settings.cache_ttl(),
        IndexerEndpoints::new(settings.indexer_url()),
        settings.http_timeout(),
    );
    let search = search_index_from_settings(
        settings.search_app_id.as_deref(),
        settings.search_write_key(),
        settings.http_timeout(),
    );

    let mut config =
        ServerConfig::new(bind_addr, default_network, tokens, delegation).with_search(search);
    if let Some(url) = settings.database_url.as_deref() {
        run_pending_migrations(url)
            .await
            .wrap_err("database migration failed")?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .wrap_err("database pool construction failed")?;
        config = config.with_db_pool(pool);
    }
    if let Some(url) = settings.redis_url.as_deref() {
        let pool = build_redis_pool(url)
            .await
            .wrap_err("redis pool construction failed")?;
        config = config.with_redis_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
