//! Use-case services layered over repositories.
//!
//! # Responsibility
//! - Query layer: read-only catalog views shaped for display.
//! - Mutation layer: person deactivation, review and rating writes.
//!
//! # Invariants
//! - Services keep no state between calls; every call re-reads storage.

pub mod mutation_service;
pub mod query_service;
