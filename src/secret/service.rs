//! Cache-or-acquire resolution for the token and its defaults
//!
//! The interactive steps (browser launch, masked paste, plain prompts) are
//! injected as callbacks so the resolution logic can be tested without a
//! terminal. Anything that writes the token goes through this service; the
//! key name and default expiry live here so every writer agrees on them.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cache::CacheStore;

/// Cache key holding the token itself
pub const JWT_TOKEN_KEY: &str = "jwt_token";

/// Cache key for the remembered environment name
pub const DEFAULT_ENV_KEY: &str = "DEFAULT_ENV";

/// Cache key for the remembered resolve path
pub const RESOLVE_PATH_KEY: &str = "RESOLVE_PATH";

/// Cache key for the remembered token expiry, in seconds
pub const DEFAULT_EXPIRY_KEY: &str = "DEFAULT_EXPIRY";

/// Token expiry used when none has been remembered (2 hours)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7200);

/// Errors from token resolution
#[derive(Debug, Error)]
pub enum SecretError {
    /// A required interactive value was left empty or malformed
    #[error("Required value '{0}' was left empty or invalid")]
    Validation(String),

    /// The acquisition or prompt step itself failed
    #[error("Failed to read interactive input: {0}")]
    Acquire(#[source] std::io::Error),

    /// The resolved value could not be persisted
    #[error("Failed to persist cache entry: {0}")]
    Cache(#[source] std::io::Error),
}

/// Single-secret cache with an external re-acquisition hook
pub struct SecretCacheService {
    cache: CacheStore,
}

impl SecretCacheService {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// Returns the cached token, or acquires and caches a fresh one
    ///
    /// With `force_renew` false a non-expired cached token is returned
    /// without invoking `acquire`. Otherwise `acquire` runs exactly once;
    /// an empty result is rejected rather than cached.
    pub fn resolve(
        &self,
        force_renew: bool,
        ttl: Duration,
        acquire: impl FnOnce() -> std::io::Result<String>,
    ) -> Result<String, SecretError> {
        if !force_renew {
            if let Some(token) = self.cache.get::<String>(JWT_TOKEN_KEY) {
                debug!("serving token from cache");
                return Ok(token);
            }
        }

        let token = acquire().map_err(SecretError::Acquire)?;
        self.store_token(&token, ttl)?;
        Ok(token.trim().to_string())
    }

    /// Validates and caches a token with the given expiry
    ///
    /// Shared by `resolve` and by direct `--set-token` updates so both
    /// writers apply the same validation and TTL semantics.
    pub fn store_token(&self, token: &str, ttl: Duration) -> Result<(), SecretError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SecretError::Validation(JWT_TOKEN_KEY.to_string()));
        }
        self.cache
            .set(JWT_TOKEN_KEY, &token, Some(ttl))
            .map_err(SecretError::Cache)
    }

    /// Returns the cached token without triggering acquisition
    pub fn peek_token(&self) -> Option<String> {
        self.cache.get::<String>(JWT_TOKEN_KEY)
    }

    /// Returns a remembered default, prompting for it the first time
    ///
    /// Remembered values are stored without an expiry. Empty interactive
    /// input fails validation and nothing is cached.
    pub fn remembered(
        &self,
        key: &str,
        prompt: impl FnOnce() -> std::io::Result<String>,
    ) -> Result<String, SecretError> {
        if let Some(value) = self.cache.get::<String>(key) {
            return Ok(value);
        }

        let value = prompt().map_err(SecretError::Acquire)?;
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(SecretError::Validation(key.to_string()));
        }

        self.cache
            .set(key, &value, None)
            .map_err(SecretError::Cache)?;
        Ok(value)
    }

    /// Stores a remembered default directly, bypassing the prompt
    pub fn remember(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SecretError::Validation(key.to_string()));
        }
        self.cache.set(key, &value, None).map_err(SecretError::Cache)
    }

    /// Remembered token expiry in seconds, prompting the first time
    ///
    /// Non-numeric input fails validation so a bad expiry is never
    /// remembered.
    pub fn default_expiry(
        &self,
        prompt: impl FnOnce() -> std::io::Result<String>,
    ) -> Result<Duration, SecretError> {
        let raw = self.remembered(DEFAULT_EXPIRY_KEY, prompt)?;
        match raw.parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => {
                self.cache.evict(DEFAULT_EXPIRY_KEY);
                Err(SecretError::Validation(DEFAULT_EXPIRY_KEY.to_string()))
            }
        }
    }
}
