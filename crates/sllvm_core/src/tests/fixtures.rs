//! Temporary simulator output trees

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use tempfile::TempDir;

use crate::config::{AnalysisConfig, ParameterSet, SweepArgument, SweepKey};
use crate::model::Series;

/// Parameters used by every golden suffix
pub fn golden_params() -> ParameterSet {
    ParameterSet {
        lattice_exponent: 6,
        horizon: 250,
        initial_predators: 128,
        initial_prey: 256,
        fragmentation: 0.01,
        habitat_fraction: 0.1,
        mortality: 0.0125,
        dispersal_rate: 0.0075,
        predation_rate: 0.5,
        growth_rate: 0.3333,
        levy_exponent: 1.75,
    }
}

/// A data and results root inside a temporary directory
pub struct Tree {
    _dir: TempDir,
    pub config: AnalysisConfig,
}

impl Tree {
    pub fn new(argument: SweepArgument) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            argument,
            parameters: ParameterSet {
                lattice_exponent: 3,
                ..golden_params()
            },
            nmeasures: 4,
            tail_window: 3,
            data_root: dir.path().join("data"),
            results_root: dir.path().join("results"),
            ..Default::default()
        };
        Self { _dir: dir, config }
    }

    /// Key of `argument` for the configured parameters
    pub fn key(&self, argument: SweepArgument) -> SweepKey {
        SweepKey::new(
            &self.config.parameters,
            argument,
            &self.config.data_root,
            &self.config.results_root,
        )
    }

    /// Key of `argument` at another fragmentation level
    pub fn key_at(&self, argument: SweepArgument, h: f64) -> SweepKey {
        SweepKey::new(
            &self.config.parameters.with_fragmentation(h),
            argument,
            &self.config.data_root,
            &self.config.results_root,
        )
    }

    pub fn write_text(&self, path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub fn write_seeds(&self, key: &SweepKey, seeds: &[i64]) {
        let text: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
        self.write_text(&key.seeds_path(), &text.join("\n"));
    }

    pub fn write_values(&self, key: &SweepKey, values: &[f64]) {
        let text: Vec<String> = values.iter().map(|v| format!("{v:e}")).collect();
        self.write_text(&key.values_path().unwrap(), &text.join("\n"));
    }

    /// Write one per-seed series as the simulator would
    pub fn write_series(
        &self,
        key: &SweepKey,
        value: Option<f64>,
        seed: i64,
        series: Series,
        data: &Array1<f64>,
    ) -> PathBuf {
        let dir = key.data_dir(value);
        fs::create_dir_all(&dir).unwrap();
        let suffix = key.input_suffix().resolve(value, seed).unwrap();
        let path = dir.join(format!("{}{suffix}.npy", series.stem()));
        data.write_npy(File::create(&path).unwrap()).unwrap();
        path
    }

    /// Write an integer-typed series, as some simulator builds do
    pub fn write_counts(
        &self,
        key: &SweepKey,
        value: Option<f64>,
        seed: i64,
        series: Series,
        data: &Array1<i64>,
    ) {
        let dir = key.data_dir(value);
        fs::create_dir_all(&dir).unwrap();
        let suffix = key.input_suffix().resolve(value, seed).unwrap();
        let path = dir.join(format!("{}{suffix}.npy", series.stem()));
        data.write_npy(File::create(&path).unwrap()).unwrap();
    }
}

pub fn read_matrix(path: &Path) -> Array2<f64> {
    Array2::<f64>::read_npy(File::open(path).unwrap()).unwrap()
}
