//! Concurrent per-symbol state store.
//!
//! Five independent lock domains (reference, realtime, status, cache,
//! statistics) guard the shared mutable state of the decision core. Every
//! composite operation acquires domains in that fixed global order; the
//! ordering rule is the single deadlock-prevention invariant of the whole
//! system and is enforced at runtime in debug builds.

mod counters;
mod lifecycle;
mod lock_order;
mod store;

pub use counters::{RiskCounters, StatCounter};
pub use lifecycle::{is_rollback_transition, is_valid_transition};
pub use store::{compute_liquidity_score, PendingOrder, SymbolStateStore};
