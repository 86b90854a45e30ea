//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sllvm_core::{AnalysisConfig, IsolationNormalization, SweepArgument, Task};

/// Batch task to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    /// Quasistationary N and M over the swept argument
    Densities,
    /// Time-resolved N, M, occupancy and habitat intactness
    Evolution,
    /// Optimal dispersal exponent per fragmentation level
    Alphastar,
}

impl From<TaskArg> for Task {
    fn from(value: TaskArg) -> Self {
        match value {
            TaskArg::Densities => Task::Densities,
            TaskArg::Evolution => Task::Evolution,
            TaskArg::Alphastar => Task::Alphastar,
        }
    }
}

fn parse_argument(s: &str) -> Result<SweepArgument, String> {
    s.parse().map_err(|e: sllvm_core::AnalysisError| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "sllvm")]
#[command(about = "Aggregate sllvm predator-prey ensembles into order parameters")]
pub struct Args {
    /// Task to run
    #[arg(value_enum)]
    pub task: TaskArg,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Swept argument (lambda, alpha, H, sigma, evolution)
    #[arg(short, long, value_parser = parse_argument)]
    pub argument: Option<SweepArgument>,

    /// Root of the simulator output tree
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Root for aggregated results and the log file
    #[arg(long)]
    pub results_root: Option<PathBuf>,

    /// Lattice exponent m (L = 2^m)
    #[arg(short = 'm', long = "lattice-exponent")]
    pub lattice_exponent: Option<u32>,

    /// Number of time steps T
    #[arg(short = 'T', long)]
    pub horizon: Option<u64>,

    /// Initial predator count N0
    #[arg(short = 'N', long = "n0")]
    pub initial_predators: Option<u64>,

    /// Initial prey count M0
    #[arg(short = 'M', long = "m0")]
    pub initial_prey: Option<u64>,

    /// Habitat fragmentation H
    #[arg(short = 'H', long)]
    pub fragmentation: Option<f64>,

    /// Habitat fraction rho
    #[arg(long = "rho")]
    pub habitat_fraction: Option<f64>,

    /// Predator mortality mu
    #[arg(long = "mu")]
    pub mortality: Option<f64>,

    /// Dispersal rate Lambda
    #[arg(long = "Lambda")]
    pub dispersal_rate: Option<f64>,

    /// Predation rate lambda
    #[arg(long = "lambda")]
    pub predation_rate: Option<f64>,

    /// Prey growth rate sigma
    #[arg(long = "sigma")]
    pub growth_rate: Option<f64>,

    /// Lévy flight exponent alpha
    #[arg(long = "alpha")]
    pub levy_exponent: Option<f64>,

    /// Number of measurements per trajectory
    #[arg(long)]
    pub nmeasures: Option<usize>,

    /// Trailing samples averaged for quasistationary densities
    #[arg(short = 'K', long)]
    pub tail_window: Option<usize>,

    /// Hill order q of the richness metric
    #[arg(short = 'q', long)]
    pub diversity_order: Option<f64>,

    /// Normalize late isolated-patch counts by rho / FACTOR
    #[arg(long, value_name = "FACTOR")]
    pub split_horizon: Option<f64>,

    /// Print the resolved configuration as YAML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Fail when any cell could not be loaded
    #[arg(long)]
    pub strict: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Overwrite every configuration value given on the command line
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut config.argument, &self.argument);
        set(&mut config.data_root, &self.data_root);
        set(&mut config.results_root, &self.results_root);
        set(&mut config.nmeasures, &self.nmeasures);
        set(&mut config.tail_window, &self.tail_window);
        set(&mut config.diversity_order, &self.diversity_order);

        let params = &mut config.parameters;
        set(&mut params.lattice_exponent, &self.lattice_exponent);
        set(&mut params.horizon, &self.horizon);
        set(&mut params.initial_predators, &self.initial_predators);
        set(&mut params.initial_prey, &self.initial_prey);
        set(&mut params.fragmentation, &self.fragmentation);
        set(&mut params.habitat_fraction, &self.habitat_fraction);
        set(&mut params.mortality, &self.mortality);
        set(&mut params.dispersal_rate, &self.dispersal_rate);
        set(&mut params.predation_rate, &self.predation_rate);
        set(&mut params.growth_rate, &self.growth_rate);
        set(&mut params.levy_exponent, &self.levy_exponent);

        if let Some(late_factor) = self.split_horizon {
            config.isolation_normalization = IsolationNormalization::SplitHorizon { late_factor };
        }
    }
}
