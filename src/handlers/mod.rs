mod assets;
mod health;
mod metrics;
mod players;

pub use assets::index_fallback;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use players::players_handler;
