//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the corpus store.
//! - Isolate SQLite query details from scoring and service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Article::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod article_repo;
pub mod comparison_repo;
pub mod pattern_repo;
pub mod stats_repo;
