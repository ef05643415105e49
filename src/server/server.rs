//! Axum server lifecycle: bind, serve, graceful shutdown

use super::routes;
use super::state::AppState;
use log::info;
use std::future::Future;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid bind address {0}: {1}")]
    InvalidAddress(String, std::net::AddrParseError),

    #[error("Failed to bind to {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Serve the API until `shutdown` resolves
pub async fn start_server<F>(state: AppState, bind_addr: &str, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| ServerError::InvalidAddress(bind_addr.to_string(), e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind(addr, e))?;

    info!("✅ Listening on http://{}", addr);
    info!("   ├─ GET /api/analyze?address=0x...");
    info!("   └─ GET /health");

    let app = routes::create_router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("✅ Server stopped gracefully (uptime {}s)", state.uptime_secs());
    Ok(())
}
