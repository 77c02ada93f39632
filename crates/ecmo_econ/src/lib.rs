//! ECMO economic evaluation front end
//!
//! Loads a YAML scenario, runs the analyses it configures with
//! `ecmo_econ_core`, and renders the results as text, YAML or JSON.

// ============================================================================
// Core modules
// ============================================================================

pub mod logging;
pub mod report;
pub mod scenario;

// ============================================================================
// Presentation helpers
// ============================================================================

pub mod format;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use logging::init_logging;
pub use report::{ScenarioReport, render_text, run_scenario};
pub use scenario::{Scenario, ScenarioError};
