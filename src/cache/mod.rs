//! Persistent TTL cache shared by the history and token tools
//!
//! This module provides a file-backed key/value store with per-entry expiry.
//! Both tools read and write the same on-disk cache directory, so state set
//! by one invocation (a query result, a token, a remembered default) is
//! visible to the next.

mod store;

pub use store::CacheStore;
