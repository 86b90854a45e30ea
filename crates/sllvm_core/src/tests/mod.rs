//! Integration tests for the sllvm analysis engine
//!
//! Tests are organized by topic:
//! - `file_keys` - Suffixes and directories against the simulator's naming
//! - `densities` - Quasistationary densities over a sweep on disk
//! - `evolution` - Time-resolved series on disk
//! - `alphastar` - Optimal exponent search on disk
//!
//! `fixtures` builds simulator output trees in temporary directories.

mod file_keys;
mod fixtures;
