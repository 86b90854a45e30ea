//! Command-line driver for the sllvm ensemble analysis
//!
//! Resolves an [`sllvm_core::AnalysisConfig`] from defaults, an optional YAML
//! file and command-line flags, installs logging and runs one batch task.

// ============================================================================
// Driver modules
// ============================================================================

pub mod cli;
pub mod logging;
pub mod report;
pub mod settings;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cli::Args;
pub use logging::init_logging;
pub use report::render_summary;
pub use settings::{load_config, resolve_config};
