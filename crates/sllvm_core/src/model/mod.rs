//! Data types flowing between loaders, aggregators and writers

mod diagnostics;
mod results;

pub use diagnostics::{CellIndex, Diagnostic, Diagnostics};
pub use results::{
    DensityEvolution, OptimalExponents, PopulationDensities, Series, present_mean,
};
