//! Backend entry-point: wires the board, its search index worker, and the
//! HTTP server.

mod server;

use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use server::{AppConfig, Board, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();
    let server_config = config.server_config()?;
    let board = Board::in_memory(config.board_service_config(), config.search_sync_config());

    board.synchronizer.start();
    let indexed = board
        .synchronizer
        .reindex_all()
        .await
        .map_err(|e| std::io::Error::other(format!("search reindex failed: {e}")))?;
    info!(indexed, "search index rebuilt");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), board.http_state(), server_config)?;
    info!(bind_addr = %config.bind_addr, "board listening");

    let result = server.await;
    health_state.mark_unhealthy();
    board.synchronizer.shutdown();
    result
}
