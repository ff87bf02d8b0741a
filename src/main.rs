use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use partyof4::config::Config;
use partyof4::database::{self, schema};
use partyof4::state::AppState;
use partyof4::web::build_router;
use partyof4::BUILD_ID;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Laad .env bestand
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    // 2. Verbind met de Database
    info!("Verbinden met database: {}", config.database_url);
    let pool = database::connect(&config.database_url).await?;
    schema::ensure_schema(&pool).await?;

    let state = AppState::new(pool, config.foursquare.clone(), config.password_cost)?;
    let app = build_router(state);

    // 3. Start de server (met fallback poort)
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = config.port.saturating_add(1);
            warn!(
                "⚠️  Kon niet binden op {}: {}. Probeer fallback {}:{}",
                addr, e, config.host, fallback_port
            );
            let fallback: SocketAddr = format!("{}:{}", config.host, fallback_port).parse()?;
            tokio::net::TcpListener::bind(fallback).await?
        }
    };

    let bound_addr = listener.local_addr()?;
    info!("🚀 partyof4 ({}) draait op http://{}", BUILD_ID, bound_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
