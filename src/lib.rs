//! Player list proxy for game servers.
//!
//! Looks up `http://{server}/players.json` on behalf of a browser, behind an
//! address validator and a per-client fixed window rate limit.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod handlers;
pub mod metrics;
pub mod rate_limit;
pub mod server;
pub mod state;
pub mod validator;

pub use config::Args;
pub use state::AppState;
