//! Networking: wire schema, transport seam, and the typed API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` builds requests and normalizes failures, `transport` moves bytes,
//! and `types` defines the shared wire schema.

pub mod api;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;
