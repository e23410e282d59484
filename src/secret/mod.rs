//! Token caching with external re-acquisition
//!
//! A single JWT token is cached on disk with an expiry and re-acquired
//! through a browser-assisted flow whenever it is absent, expired, or the
//! caller forces renewal. Auxiliary defaults (environment name, resolve
//! path, expiry) follow the same cache-or-prompt pattern but never expire,
//! giving the tool remembered defaults without a config file.

pub mod prompt;
pub mod service;

pub use service::{SecretCacheService, SecretError};
