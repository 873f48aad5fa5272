//! Backend entry-point: loads settings, prepares storage, and runs the server.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use chirp_backend::inbound::http::health::HealthState;
use chirp_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use chirp_backend::outbound::session::RedisSessionStore;
use chirp_backend::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn connect_database(settings: &AppSettings, url: &str) -> Result<DbPool> {
    if settings.run_migrations {
        run_pending_migrations(url)
            .await
            .wrap_err("failed to apply database migrations")?;
    }
    let config = PoolConfig::new(url).with_max_size(settings.db_max_connections());
    DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(bind_addr, settings.cookie_secure)
        .with_max_page_size(settings.max_page_size()?);

    if let Some(url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect_database(settings, url).await?);
    }
    if let Some(url) = settings.redis_url.as_deref() {
        let store = RedisSessionStore::connect(url)
            .await
            .wrap_err("failed to connect to Redis")?;
        config = config.with_session_store(store);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::build_metrics()?);

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = server_config(&settings).await?;
    let bind_addr = config.bind_addr;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            health_state.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    server.await.wrap_err("server terminated with an error")
}
