//! Analysis configuration
//!
//! [`AnalysisConfig`] gathers everything a batch needs: the base parameter
//! set of the external sllvm simulation, the sweep mode, the aggregation
//! options and the data/results roots. It deserializes from YAML (field names
//! accept the physics symbols as aliases, e.g. `H`, `rho`, `Lambda`).
//!
//! [`SweepKey`] is derived from it by [`SweepKey::build`] and carries all file
//! naming for the batch.

mod key;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

pub use key::{Field, FieldSpec, Precision, SuffixTemplate, SweepKey};

/// Default number of trailing samples averaged for quasistationary densities
pub const DEFAULT_TAIL_WINDOW: usize = 50;

/// Which base parameter varies along the independent axis of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SweepArgument {
    /// Local predation rate
    Lambda,
    /// Lévy dispersal exponent
    #[default]
    Alpha,
    /// Habitat fragmentation
    Fragmentation,
    /// Prey growth rate
    Sigma,
    /// Time evolution of a single parameter point (no varying value)
    Evolution,
}

impl SweepArgument {
    pub const ALL: [SweepArgument; 5] = [
        SweepArgument::Lambda,
        SweepArgument::Alpha,
        SweepArgument::Fragmentation,
        SweepArgument::Sigma,
        SweepArgument::Evolution,
    ];

    /// Name used by the external simulator for directories and value lists
    pub fn name(self) -> &'static str {
        match self {
            SweepArgument::Lambda => "lambda",
            SweepArgument::Alpha => "alpha",
            SweepArgument::Fragmentation => "H",
            SweepArgument::Sigma => "sigma",
            SweepArgument::Evolution => "evolution",
        }
    }

    /// Whether the sweep has an independent variable read from `<name>.txt`
    pub fn has_variable(self) -> bool {
        !matches!(self, SweepArgument::Evolution)
    }
}

impl fmt::Display for SweepArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepArgument {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        SweepArgument::ALL
            .into_iter()
            .find(|arg| arg.name() == s)
            .ok_or_else(|| AnalysisError::UnsupportedArgument(s.to_string()))
    }
}

impl TryFrom<String> for SweepArgument {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SweepArgument> for String {
    fn from(value: SweepArgument) -> Self {
        value.name().to_string()
    }
}

/// Base parameters of one external simulation run, minus seed and swept value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Lattice exponent m, the lattice is 2^m x 2^m
    #[serde(alias = "m")]
    pub lattice_exponent: u32,
    /// Number of simulated time steps T
    #[serde(alias = "T")]
    pub horizon: u64,
    /// Initial predator count N0
    #[serde(alias = "N0")]
    pub initial_predators: u64,
    /// Initial prey count M0
    #[serde(alias = "M0")]
    pub initial_prey: u64,
    /// Fragmentation (Hurst exponent) H of the habitat landscape
    #[serde(alias = "H")]
    pub fragmentation: f64,
    /// Fraction of lattice sites that are habitat, rho
    #[serde(alias = "rho")]
    pub habitat_fraction: f64,
    /// Predator mortality mu
    #[serde(alias = "mu")]
    pub mortality: f64,
    /// Long-range dispersal rate Lambda
    #[serde(alias = "Lambda")]
    pub dispersal_rate: f64,
    /// Local predation rate lambda
    #[serde(alias = "lambda")]
    pub predation_rate: f64,
    /// Prey growth rate sigma
    #[serde(alias = "sigma")]
    pub growth_rate: f64,
    /// Lévy flight exponent alpha
    #[serde(alias = "alpha")]
    pub levy_exponent: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            lattice_exponent: 7,
            horizon: 500,
            initial_predators: 50,
            initial_prey: 50,
            fragmentation: 0.5,
            habitat_fraction: 0.2,
            mortality: 0.05,
            dispersal_rate: 0.01,
            predation_rate: 1.0,
            growth_rate: 0.25,
            levy_exponent: 2.0,
        }
    }
}

impl ParameterSet {
    /// Lattice side length L = 2^m
    pub fn lattice_size(&self) -> u64 {
        1u64 << self.lattice_exponent
    }

    /// Total habitat capacity rho * L^2
    pub fn habitat_capacity(&self) -> f64 {
        let l = self.lattice_size() as f64;
        self.habitat_fraction * l * l
    }

    /// Copy with a different fragmentation value
    #[must_use]
    pub fn with_fragmentation(&self, fragmentation: f64) -> Self {
        Self {
            fragmentation,
            ..self.clone()
        }
    }
}

/// How cumulative isolated-patch counts are normalized into an intactness index
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationNormalization {
    /// Divide by rho * L^2 over the whole horizon
    #[default]
    Constant,
    /// Divide the first half of the horizon by rho * L^2 and the second half
    /// by (rho / late_factor) * L^2
    SplitHorizon { late_factor: f64 },
}

/// Complete configuration for one analysis batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub argument: SweepArgument,
    pub parameters: ParameterSet,
    /// Number of measurement samples recorded by the simulator
    pub nmeasures: usize,
    /// Trailing samples averaged for quasistationary densities
    pub tail_window: usize,
    /// Hill order q used for species richness
    pub diversity_order: f64,
    pub isolation_normalization: IsolationNormalization,
    /// Root of the simulator's output tree
    pub data_root: PathBuf,
    /// Root under which aggregated results are written
    pub results_root: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            argument: SweepArgument::default(),
            parameters: ParameterSet::default(),
            nmeasures: 100,
            tail_window: DEFAULT_TAIL_WINDOW,
            diversity_order: 1.0,
            isolation_normalization: IsolationNormalization::default(),
            data_root: PathBuf::from("data"),
            results_root: PathBuf::from("results"),
        }
    }
}

impl AnalysisConfig {
    /// Check option ranges before any I/O happens
    pub fn validate(&self) -> Result<()> {
        if self.tail_window == 0 {
            return Err(AnalysisError::Config(
                "tail window must be at least one sample".to_string(),
            ));
        }
        if self.parameters.lattice_exponent >= 32 {
            return Err(AnalysisError::Config(format!(
                "lattice exponent {} is out of range",
                self.parameters.lattice_exponent
            )));
        }
        if !self.diversity_order.is_finite() {
            return Err(AnalysisError::Config(format!(
                "diversity order must be finite, got {}",
                self.diversity_order
            )));
        }
        if let IsolationNormalization::SplitHorizon { late_factor } = self.isolation_normalization
            && !(late_factor.is_finite() && late_factor > 0.0)
        {
            return Err(AnalysisError::Config(format!(
                "split-horizon late factor must be positive, got {late_factor}"
            )));
        }
        Ok(())
    }

    /// Output-suffix tags for options that change aggregated values but are
    /// not simulation parameters. Empty for default options.
    pub fn option_tags(&self) -> String {
        let mut tags = String::new();
        if self.tail_window != DEFAULT_TAIL_WINDOW {
            tags.push_str(&format!("_K{}", self.tail_window));
        }
        tags
    }

    /// Tags for richness-derived outputs; the Shannon order is untagged
    pub fn richness_tags(&self) -> String {
        if self.diversity_order == 1.0 {
            String::new()
        } else {
            format!("_q{:.4}", self.diversity_order)
        }
    }

    /// Tags for the time-evolution outputs
    pub fn evolution_tags(&self) -> String {
        match self.isolation_normalization {
            IsolationNormalization::Constant => String::new(),
            IsolationNormalization::SplitHorizon { late_factor } => {
                format!("_split{late_factor:.4}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_round_trips_through_names() {
        for arg in SweepArgument::ALL {
            assert_eq!(arg.name().parse::<SweepArgument>().unwrap(), arg);
        }
    }

    #[test]
    fn test_unknown_argument_is_configuration_error() {
        let err = "kappa".parse::<SweepArgument>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedArgument(ref name) if name == "kappa"));
    }

    #[test]
    fn test_argument_names_are_case_sensitive() {
        assert!("h".parse::<SweepArgument>().is_err());
        assert!("Alpha".parse::<SweepArgument>().is_err());
    }

    #[test]
    fn test_lattice_size_and_capacity() {
        let params = ParameterSet {
            lattice_exponent: 4,
            habitat_fraction: 0.25,
            ..Default::default()
        };
        assert_eq!(params.lattice_size(), 16);
        assert_eq!(params.habitat_capacity(), 64.0);
    }

    #[test]
    fn test_validate_rejects_zero_tail_window() {
        let config = AnalysisConfig {
            tail_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_late_factor() {
        let config = AnalysisConfig {
            isolation_normalization: IsolationNormalization::SplitHorizon { late_factor: 0.0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_option_tags() {
        assert_eq!(AnalysisConfig::default().option_tags(), "");
        assert_eq!(AnalysisConfig::default().evolution_tags(), "");

        let config = AnalysisConfig {
            tail_window: 20,
            isolation_normalization: IsolationNormalization::SplitHorizon { late_factor: 5.0 },
            ..Default::default()
        };
        assert_eq!(config.option_tags(), "_K20");
        assert_eq!(config.evolution_tags(), "_split5.0000");
    }

    #[test]
    fn test_richness_tags() {
        assert_eq!(AnalysisConfig::default().richness_tags(), "");
        let config = AnalysisConfig {
            diversity_order: 2.0,
            ..Default::default()
        };
        assert_eq!(config.richness_tags(), "_q2.0000");
    }
}
