//! State module for tracking per-domain progress
//!
//! - `DomainStage`: where a domain is in the validate → fetch → parse →
//!   discover → collect → select pipeline

mod domain_stage;

pub use domain_stage::DomainStage;
