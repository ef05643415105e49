//! HTTP API exposing the wallet analyzer

pub mod routes;
pub mod server;
pub mod state;

pub use routes::create_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
