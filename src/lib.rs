//! Edge Tools library
//!
//! Shared plumbing for the `edgehist` and `edgejwt` binaries: a persistent
//! TTL cache, snapshot-isolated history queries, result export, and the
//! token cache with its browser-assisted acquisition flow.

pub mod cache;
pub mod cli;
pub mod history;
pub mod secret;
