//! Rewrite-worthiness scoring engine.
//!
//! # Responsibility
//! - Turn article metadata into five axis scores, a composite score and a
//!   rewrite type.
//! - Partition scored articles into rewrite/review/archive/deletion buckets.
//!
//! # Invariants
//! - Evaluation order is fixed: rule table, length, recency, risk,
//!   aggregation, type selection.
//! - Everything here is pure and safe to run from parallel workers.

pub mod adjust;
pub mod classify;
pub mod pipeline;
pub mod risk;
pub mod rules;
