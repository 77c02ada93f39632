//! ECMO health-economic evaluation library
//!
//! This crate computes the cost and quality-of-life impact of extracorporeal
//! membrane oxygenation for individual patients and whole cohorts:
//! - Procedure, daily, replacement and complication costs with seeded sampling
//! - QALYs from outcome utilities with mid-point discounting
//! - ICERs and cost-effectiveness classification against a comparator
//! - Multi-year population budget impact
//! - Taiwan NHI reimbursement and hospital margin
//! - One-way and two-way sensitivity analysis
//! - Risk quintile stratification
//! - Acceptability curves, net monetary benefit, bootstrap, PSA and EVPI
//!
//! # Builder DSL
//!
//! ```ignore
//! use ecmo_econ_core::config::ParameterSetBuilder;
//! use ecmo_econ_core::model::OutcomeCategory;
//!
//! let params = ParameterSetBuilder::new()
//!     .daily_rate("icu_bed", 4_800.0)
//!     .complication("stroke", 0.07, 45_000.0)
//!     .utility(OutcomeCategory::Normal, 0.82)
//!     .discount_rate(0.03)
//!     .build()?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod budget;
pub mod cohort;
pub mod cost;
pub mod error;
pub mod icer;
pub mod nhi;
pub mod qaly;
pub mod stratify;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cohort::{evaluate_cohort, partition_valid};
pub use config::{ParameterKey, ParameterSet, ParameterSetBuilder};
pub use error::{AnalysisError, ConfigError, RecordError};
