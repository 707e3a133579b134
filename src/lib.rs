//! My Horse Manager - Subscription Core
//!
//! This crate implements the entitlement and subscription-gating core of the
//! My Horse Manager mobile client: identity binding against the purchase
//! service, reconciliation of purchase-service / admin / backend-manual
//! premium signals into one authoritative subscription state, and free-tier
//! limit enforcement derived from that state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
