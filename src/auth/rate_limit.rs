//! Fixed-window request limiter for the credential endpoints.
//!
//! State lives in process memory, so limits are per instance.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

const PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

struct Window {
    opened_at: Instant,
    hits: u32,
}

#[derive(Clone)]
pub struct RateLimitState {
    policy: RateLimitPolicy,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimitState {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn check(&self, key: &str) -> Decision {
        self.hit(key, Instant::now()).await
    }

    async fn hit(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.to_owned()).or_insert(Window {
            opened_at: now,
            hits: 0,
        });

        let elapsed = now.saturating_duration_since(window.opened_at);
        if elapsed >= self.policy.window {
            window.opened_at = now;
            window.hits = 0;
        }

        if window.hits >= self.policy.max_requests {
            return Decision::Limited {
                retry_after: self.policy.window.saturating_sub(elapsed),
            };
        }

        window.hits += 1;
        Decision::Allowed {
            remaining: self.policy.max_requests - window.hits,
        }
    }

    /// Forget keys whose window closed at least one full window ago.
    /// Returns how many keys remain tracked.
    pub async fn purge_expired(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let horizon = self.policy.window * 2;
        windows.retain(|_, w| now.saturating_duration_since(w.opened_at) < horizon);
        windows.len()
    }

    pub fn spawn_purge_task(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                let tracked = limiter.purge_expired(Instant::now()).await;
                tracing::debug!(tracked_keys = tracked, "Rate limiter purged");
            }
        })
    }
}

/// Limits each client IP separately on every path it is layered over.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("{}|{}", addr.ip(), req.uri().path());

    match state.rate_limiter.check(&key).await {
        Decision::Allowed { remaining } => {
            tracing::debug!(key = %key, remaining, "Auth request admitted");
            Ok(next.run(req).await)
        }
        Decision::Limited { retry_after } => {
            // Round up so clients never retry a fraction of a second early
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            tracing::warn!(key = %key, retry_after_secs, "Auth request rate limited");
            Err(AppError::RateLimited { retry_after_secs })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimitState {
        RateLimitState::new(RateLimitPolicy {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_budget_counts_down_then_limits() {
        let limiter = limiter(3);
        let t0 = Instant::now();

        assert_eq!(limiter.hit("ip|/login", t0).await, Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.hit("ip|/login", t0).await, Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.hit("ip|/login", t0).await, Decision::Allowed { remaining: 0 });

        let later = t0 + Duration::from_secs(20);
        assert_eq!(
            limiter.hit("ip|/login", later).await,
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[tokio::test]
    async fn test_window_reopens_after_expiry() {
        let limiter = limiter(1);
        let t0 = Instant::now();

        limiter.hit("ip|/login", t0).await;
        assert!(matches!(
            limiter.hit("ip|/login", t0).await,
            Decision::Limited { .. }
        ));

        let next_window = t0 + Duration::from_secs(60);
        assert_eq!(
            limiter.hit("ip|/login", next_window).await,
            Decision::Allowed { remaining: 0 }
        );
    }

    #[tokio::test]
    async fn test_paths_have_separate_budgets() {
        let limiter = limiter(1);
        let t0 = Instant::now();

        limiter.hit("ip|/api/auth/login", t0).await;
        assert_eq!(
            limiter.hit("ip|/api/auth/register", t0).await,
            Decision::Allowed { remaining: 0 }
        );
    }

    #[tokio::test]
    async fn test_purge_drops_only_stale_keys() {
        let limiter = limiter(5);
        let t0 = Instant::now();

        limiter.hit("old", t0).await;
        limiter.hit("fresh", t0 + Duration::from_secs(100)).await;

        assert_eq!(limiter.purge_expired(t0 + Duration::from_secs(130)).await, 1);
    }
}
