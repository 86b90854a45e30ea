//! Ensemble analysis for the stochastic lattice Lotka-Volterra model
//!
//! This crate turns the per-seed trajectories written by the sllvm simulator
//! into order parameters. It supports:
//! - File keys matching the simulator's naming for the lambda, alpha, H,
//!   sigma and evolution sweeps
//! - Ensemble loading that tolerates missing or malformed files
//! - Quasistationary densities from tail-window means
//! - Time-resolved habitat occupancy and intactness
//! - Hill diversity and species richness
//! - The dispersal exponent alpha* maximizing density or richness over H
//!
//! # Example
//!
//! ```ignore
//! use sllvm_core::{AnalysisConfig, NpyFiles, SweepArgument, pipeline};
//!
//! let config = AnalysisConfig {
//!     argument: SweepArgument::Alpha,
//!     ..Default::default()
//! };
//! let report = pipeline::compute_population_densities(&config, &NpyFiles)?;
//! for diagnostic in report.result.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod ensemble;
pub mod error;
pub mod numeric;
pub mod optimization;
pub mod output;
pub mod pipeline;

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

pub use config::{AnalysisConfig, IsolationNormalization, ParameterSet, SweepArgument, SweepKey};
pub use ensemble::{EnsembleLoader, NpyFiles, TrajectorySource};
pub use error::{AnalysisError, Result};
pub use model::{Diagnostic, Diagnostics};
pub use output::ResultWriter;
pub use pipeline::{Summary, Task};
