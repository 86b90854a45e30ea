//! YAML configuration files
//!
//! A file holds any subset of [`AnalysisConfig`]; absent keys take their
//! defaults. Example:
//!
//! ```yaml
//! argument: alpha
//! nmeasures: 100
//! tail_window: 50
//! data_root: data
//! results_root: results
//! parameters:
//!   m: 7
//!   T: 500
//!   H: 0.5
//!   alpha: 2.0
//! isolation_normalization:
//!   split_horizon:
//!     late_factor: 2.0
//! ```

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use sllvm_core::AnalysisConfig;

use crate::cli::Args;

/// Read a configuration file
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&content).wrap_err_with(|| format!("Failed to parse config {}", path.display()))
}

fn parse_config(yaml: &str) -> Result<AnalysisConfig, serde_saphyr::Error> {
    if yaml.trim().is_empty() {
        return Ok(AnalysisConfig::default());
    }
    serde_saphyr::from_str(yaml)
}

/// Render a configuration as YAML
pub fn to_yaml(config: &AnalysisConfig) -> Result<String> {
    serde_saphyr::to_string(config).wrap_err("Failed to serialize config")
}

/// Defaults, then the config file, then command-line overrides
pub fn resolve_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}
