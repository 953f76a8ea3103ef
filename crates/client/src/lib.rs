//! HTTP client for the transfer backend.
//!
//! [`Client`] wraps `reqwest` with per-call timeouts and folds every
//! failure into one [`Error`] taxonomy: transport failures, timeouts,
//! non-2xx statuses and `success: false` bodies stay distinguishable.
//! [`AccessKeepalive`] is an owned periodic task that keeps a cached
//! payload alive on the backend until it is stopped or dropped.

pub mod client;
pub mod keepalive;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{Client, Error};
pub use keepalive::AccessKeepalive;
