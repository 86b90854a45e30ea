//! Search for the dispersal exponent that maximizes an order parameter
//!
//! The only algorithm needed is an exhaustive scan of the simulated
//! (H, alpha) grid; see [`OptimalExponentSearch`].

mod grid_search;

pub use grid_search::{OptimalExponentSearch, ProgressCallback, first_argmax};
