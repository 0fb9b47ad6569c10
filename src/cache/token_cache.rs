use std::time::{Duration, Instant};

/// Tokens are treated as expired this long before the provider says they are,
/// so a request never goes out with a token that dies in flight.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct CachedToken {
    pub access_token: String,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        let age = now.saturating_duration_since(self.cached_at);
        age + REFRESH_MARGIN < self.ttl
    }
}

/// Single-slot cache for the provider bearer token.
#[derive(Debug, Default)]
pub struct TokenCache {
    entry: Option<CachedToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    pub fn get(&self) -> Option<String> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.access_token.clone())
    }

    pub fn set(&mut self, access_token: String, expires_in_seconds: u64) {
        self.entry = Some(CachedToken {
            access_token,
            cached_at: Instant::now(),
            ttl: Duration::from_secs(expires_in_seconds),
        });
    }

    /// Clears the slot only if it still holds `access_token`. A token stored
    /// by another request in the meantime is kept.
    pub fn clear_if(&mut self, access_token: &str) -> bool {
        let matches = self
            .entry
            .as_ref()
            .is_some_and(|entry| entry.access_token == access_token);
        if matches {
            self.entry = None;
        }
        matches
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
