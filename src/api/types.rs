//! Shared types for the API layer.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::verification::{FlowSessions, Verifier};

/// Most clients the rate limiter tracks at once.
const MAX_TRACKED_CLIENTS: usize = 10_000;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub verifier: Verifier,
    pub sessions: Arc<FlowSessions>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub trusted_proxies: Arc<[IpAddr]>,
}

impl ApiContext {
    pub fn new(verifier: Verifier, config: &AppConfig) -> Self {
        Self {
            verifier,
            sessions: Arc::new(FlowSessions::default()),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::with_limits(
                config.rate_per_minute,
                config.rate_per_hour,
            ))),
            trusted_proxies: config.trusted_proxies.clone().into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    max_clients: usize,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(100, 1000)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
            max_clients: MAX_TRACKED_CLIENTS,
        }
    }

    /// Cap the number of tracked clients (at least one).
    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients.max(1);
        self
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        if !self.windows.contains_key(client) && self.windows.len() >= self.max_clients {
            self.make_room(now);
        }

        let entries = self.windows.entry(client.to_string()).or_default();

        // Clean entries older than 1 hour
        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        // Check per-minute
        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        // Check per-hour
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }

    /// Forget clients idle for an hour; if the table is still full, evict
    /// the client seen least recently.
    fn make_room(&mut self, now: Instant) {
        self.windows.retain(|_, entries| {
            entries
                .last()
                .is_some_and(|ts| now.duration_since(*ts) < Duration::from_secs(3600))
        });
        if self.windows.len() < self.max_clients {
            return;
        }
        let oldest = self
            .windows
            .iter()
            .min_by_key(|(_, entries)| entries.last().copied())
            .map(|(client, _)| client.clone());
        if let Some(client) = oldest {
            tracing::debug!(client = %client, "Rate limiter full, evicting oldest client");
            self.windows.remove(&client);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
