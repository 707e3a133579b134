//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Entitlement reconciliation, plan classification,
//!   session lifecycle, and free-tier limit policy

pub mod foundation;
pub mod subscription;
