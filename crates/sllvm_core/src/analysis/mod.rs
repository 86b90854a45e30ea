//! Order parameters extracted from ensembles of trajectories.
//!
//! - [`quasistationary`]: tail-window mean densities
//! - [`evolution`]: occupancy fraction and habitat intactness over time
//! - [`diversity`]: Hill diversity and species richness
//!
//! All functions here are pure; loading and diagnostics live in
//! [`crate::ensemble`].

pub mod diversity;
pub mod evolution;
pub mod quasistationary;

pub use diversity::{richness, richness_cell, true_diversity, true_diversity_cell};
pub use evolution::TimeEvolutionAggregator;
pub use quasistationary::{QuasistationaryAggregator, TailEstimate};
