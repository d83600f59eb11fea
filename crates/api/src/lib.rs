//! HTTP service for the content-operations dashboard.
//!
//! Operators log in through the [`session::SessionGate`]; every other screen
//! runs against the database connection their session owns.

pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub use config::AppConfig;
pub use routes::build_router;
pub use state::AppState;
