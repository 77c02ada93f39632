//! Sensitivity and decision-uncertainty analysis.
//!
//! Every analysis re-runs the cost and QALY engines on copies of the base
//! `ParameterSet`; the base is only ever borrowed.
//!
//! ```ignore
//! use ecmo_econ_core::analysis::{one_way, SensitivityRange, StrategyComparison};
//! use ecmo_econ_core::config::ParameterKey;
//!
//! let comparison = StrategyComparison::new(&ecmo_arm, &conventional_arm);
//! let ranges = vec![
//!     SensitivityRange::new(ParameterKey::CostMultiplier, 0.8, 1.2),
//!     SensitivityRange::new(ParameterKey::DiscountRate, 0.0, 0.05),
//! ];
//! let result = one_way(&comparison, &params, &ranges, seed)?;
//! for entry in result.tornado() {
//!     println!("{}: {:?}", entry.parameter, entry.swing());
//! }
//! ```

mod config;
mod sensitivity;
mod uncertainty;

pub use config::*;
pub use sensitivity::*;
pub use uncertainty::*;
