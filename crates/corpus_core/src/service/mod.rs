//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod dashboard;
pub mod elo_sync;
pub mod ingest;
pub mod patterns;
pub mod sampler;
pub mod scoring_service;
