use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::error::ApiError;
use crate::metrics::{RATE_LIMIT_IDENTITIES, THROTTLED_TOTAL};
use crate::state::AppState;

// Rate limit entry - tracks requests per client identity
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Throttled,
}

/// Fixed window limiter keyed by client identity.
///
/// Windows do not slide: a client may spend its whole budget at the end of
/// one window and again at the start of the next.
pub struct RequestGate {
    windows: DashMap<String, RateLimitEntry>,
    max_requests: u32, // 0 disables the gate
    window: Duration,
}

impl RequestGate {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn admit(&self, client_id: &str) -> Admission {
        self.admit_at(client_id, Instant::now())
    }

    // The entry guard holds the shard lock, so check-then-increment is atomic
    // for a given identity.
    fn admit_at(&self, client_id: &str, now: Instant) -> Admission {
        if self.max_requests == 0 {
            return Admission::Admitted;
        }

        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window expired..? Reset it
        if now.saturating_duration_since(entry.window_start) > self.window {
            entry.count = 1;
            entry.window_start = now;
            return Admission::Admitted;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            return Admission::Admitted;
        }

        Admission::Throttled
    }

    /// Drop windows that have expired. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, entry| now.saturating_duration_since(entry.window_start) <= self.window);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

// Gate middleware - runs before validation and fetch
pub async fn gate_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let client_id = peer.ip().to_string();

    let admission = state.gate.admit(&client_id);
    RATE_LIMIT_IDENTITIES.set(state.gate.tracked() as f64);

    match admission {
        Admission::Admitted => next.run(request).await,
        Admission::Throttled => {
            THROTTLED_TOTAL.inc();
            tracing::warn!(client = %client_id, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::Throttled.into_response()
        }
    }
}

// Background sweeper - keeps the window map from growing with every client ever seen
pub async fn window_sweeper(state: Arc<AppState>, every: Duration) {
    let mut interval = interval(every);

    tracing::debug!(interval = ?every, "Rate limit window sweeper started");

    loop {
        interval.tick().await;

        let removed = state.gate.sweep_expired();
        RATE_LIMIT_IDENTITIES.set(state.gate.tracked() as f64);
        if removed > 0 {
            tracing::debug!(removed, remaining = state.gate.tracked(), "Swept expired rate limit windows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn admits_up_to_the_maximum_then_throttles() {
        let gate = RequestGate::new(120, WINDOW);
        let now = Instant::now();

        for i in 0..120 {
            assert_eq!(gate.admit_at("10.0.0.1", now), Admission::Admitted, "request {}", i + 1);
        }
        assert_eq!(gate.admit_at("10.0.0.1", now), Admission::Throttled);
        assert_eq!(gate.admit_at("10.0.0.1", now), Admission::Throttled);
    }

    #[test]
    fn identities_are_counted_separately() {
        let gate = RequestGate::new(1, WINDOW);
        let now = Instant::now();

        assert_eq!(gate.admit_at("10.0.0.1", now), Admission::Admitted);
        assert_eq!(gate.admit_at("10.0.0.1", now), Admission::Throttled);
        assert_eq!(gate.admit_at("10.0.0.2", now), Admission::Admitted);
        assert_eq!(gate.tracked(), 2);
    }

    #[test]
    fn window_resets_once_elapsed() {
        let gate = RequestGate::new(2, WINDOW);
        let start = Instant::now();

        gate.admit_at("a", start);
        gate.admit_at("a", start);
        assert_eq!(gate.admit_at("a", start + WINDOW), Admission::Throttled);

        let later = start + WINDOW + Duration::from_millis(1);
        assert_eq!(gate.admit_at("a", later), Admission::Admitted);
        assert_eq!(gate.admit_at("a", later), Admission::Admitted);
        assert_eq!(gate.admit_at("a", later), Admission::Throttled);
    }

    #[test]
    fn zero_limit_disables_the_gate() {
        let gate = RequestGate::new(0, WINDOW);
        let now = Instant::now();
        for _ in 0..1000 {
            assert_eq!(gate.admit_at("a", now), Admission::Admitted);
        }
        assert_eq!(gate.tracked(), 0);
    }

    #[test]
    fn sweep_drops_only_expired_windows() {
        let gate = RequestGate::new(5, WINDOW);
        let start = Instant::now();

        gate.admit_at("old", start);
        gate.admit_at("fresh", start + WINDOW);

        let removed = gate.sweep_expired_at(start + WINDOW + Duration::from_secs(1));
        assert_eq!(removed, 1);
        assert_eq!(gate.tracked(), 1);
    }

    #[test]
    fn concurrent_admissions_never_exceed_the_maximum() {
        let gate = Arc::new(RequestGate::new(50, WINDOW));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| gate.admit("shared") == Admission::Admitted)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }
}
