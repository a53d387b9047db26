use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("player_finder_requests_total", "Total number of player lookups").unwrap();
    pub static ref THROTTLED_TOTAL: Counter =
        register_counter!("player_finder_throttled_total", "Requests refused by the rate limiter").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("player_finder_upstream_failures_total", "Failed players.json fetches").unwrap();
    pub static ref FETCH_LATENCY: Histogram = register_histogram!(
        "player_finder_fetch_latency_seconds",
        "Upstream players.json fetch latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_IDENTITIES: Gauge =
        register_gauge!("player_finder_rate_limit_identities", "Client identities with an open rate limit window").unwrap();
}
