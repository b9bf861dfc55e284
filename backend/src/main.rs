//! Backend entry point: configuration, migrations, and the HTTP server.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pixbin::config::{AppConfig, BuildMode};
use pixbin::inbound::http::health::HealthState;
use pixbin::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config = AppConfig::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let database_url = app_config.database_url.clone();
    let applied = web::block(move || run_pending_migrations(&database_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema up to date");

    let pool = DbPool::new(PoolConfig::new(app_config.database_url.as_str()))
        .await
        .map_err(std::io::Error::other)?;

    info!(
        bind_addr = %app_config.bind_addr,
        media_dir = %app_config.media_dir,
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(&app_config, pool))?;
    server.await
}
