//! Loading ensembles of per-seed trajectories
//!
//! A missing or unreadable trajectory never aborts a batch: the affected cell
//! stays at zero, is flagged as not present and a [`Diagnostic`] is recorded.
//! Cells are independent and are evaluated in parallel when the `parallel`
//! feature is enabled; results are always assembled by index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayD};
use ndarray_npy::{ReadNpyError, ReadNpyExt};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analysis::QuasistationaryAggregator;
use crate::config::SweepKey;
use crate::error::{AnalysisError, Result};
use crate::model::{CellIndex, Diagnostic, Diagnostics, Series};

/// Why a trajectory could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Missing,
    Malformed(String),
}

/// Where trajectories come from
pub trait TrajectorySource: Sync {
    /// Load one series as a flat f64 array
    fn load(&self, path: &Path) -> std::result::Result<Array1<f64>, LoadError>;
}

/// Reads `.npy` files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct NpyFiles;

impl TrajectorySource for NpyFiles {
    fn load(&self, path: &Path) -> std::result::Result<Array1<f64>, LoadError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::Missing),
            Err(e) => return Err(LoadError::Malformed(e.to_string())),
        };
        decode_npy(&bytes)
    }
}

/// Decode an npy buffer of any integer or float dtype and any rank,
/// flattened in logical (C) order
pub fn decode_npy(bytes: &[u8]) -> std::result::Result<Array1<f64>, LoadError> {
    macro_rules! try_dtypes {
        ($($t:ty),+) => {
            $(
                match ArrayD::<$t>::read_npy(bytes) {
                    Ok(array) => return Ok(array.iter().map(|&v| v as f64).collect()),
                    Err(ReadNpyError::WrongDescriptor(_)) => {}
                    Err(e) => return Err(LoadError::Malformed(e.to_string())),
                }
            )+
        };
    }

    try_dtypes!(f64, i64, f32, i32, u64, u32, i16, u16, i8, u8);
    Err(LoadError::Malformed("unsupported dtype".to_string()))
}

/// Parse a whitespace-separated numeric table the way `numpy.loadtxt` does
fn parse_table(text: &str) -> std::result::Result<Vec<f64>, String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| format!("invalid number `{token}`"))
        })
        .collect()
}

fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AnalysisError::io(path, e)),
    }
}

/// Read `seeds.txt`; a missing file is fatal
pub fn read_seeds(path: &Path) -> Result<Vec<i64>> {
    let text = read_text(path)?.ok_or_else(|| {
        AnalysisError::io(path, io::Error::new(io::ErrorKind::NotFound, "no seeds file"))
    })?;
    let parse_error = |reason: String| AnalysisError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(|token| match token.parse::<i64>() {
            Ok(seed) => Ok(seed),
            Err(_) => match token.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
                _ => Err(parse_error(format!("invalid seed `{token}`"))),
            },
        })
        .collect()
}

/// Read a list of swept values; `None` when the file does not exist
pub fn read_values(path: &Path) -> Result<Option<Vec<f64>>> {
    let Some(text) = read_text(path)? else {
        return Ok(None);
    };
    parse_table(&text)
        .map(Some)
        .map_err(|reason| AnalysisError::Parse {
            path: path.to_path_buf(),
            reason,
        })
}

/// Evaluate `f` for every cell, in parallel when enabled, keeping cell order
pub(crate) fn map_cells<T, F>(cells: &[CellIndex], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(CellIndex) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        cells.par_iter().map(|&cell| f(cell)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        cells.iter().map(|&cell| f(cell)).collect()
    }
}

/// All `[variable, seed]` cells in row-major order
pub(crate) fn grid_cells(variables: usize, seeds: usize) -> Vec<CellIndex> {
    (0..variables)
        .flat_map(|i| (0..seeds).map(move |j| CellIndex::new(i, j)))
        .collect()
}

/// Series of one cell, or the diagnostic for the first one that failed
pub type CellData = std::result::Result<Vec<Array1<f64>>, Diagnostic>;

/// Tail means over a `[variable, seed]` grid
#[derive(Debug, Clone)]
pub struct TailMeans {
    pub predators: Array2<f64>,
    pub prey: Array2<f64>,
    pub present: Array2<bool>,
    pub diagnostics: Diagnostics,
}

struct TailCell {
    predators: f64,
    prey: f64,
    present: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Loads trajectories addressed by a [`SweepKey`]
pub struct EnsembleLoader<'a, S: TrajectorySource> {
    key: &'a SweepKey,
    source: &'a S,
}

impl<'a, S: TrajectorySource> EnsembleLoader<'a, S> {
    pub fn new(key: &'a SweepKey, source: &'a S) -> Self {
        Self { key, source }
    }

    /// Directory and resolved suffix of one parameter point and seed
    pub fn locate(&self, value: Option<f64>, seed: i64) -> Result<(PathBuf, String)> {
        let suffix = self.key.input_suffix().resolve(value, seed)?;
        Ok((self.key.data_dir(value), suffix))
    }

    /// Load every requested series of one cell. Loading stops at the first
    /// series that fails, so a cell is either complete or absent.
    pub fn load_cell(
        &self,
        cell: CellIndex,
        value: Option<f64>,
        seed: i64,
        series: &[Series],
    ) -> Result<CellData> {
        let (dir, suffix) = self.locate(value, seed)?;
        let mut arrays = Vec::with_capacity(series.len());

        for &s in series {
            let path = dir.join(format!("{}{suffix}.npy", s.stem()));
            match self.source.load(&path) {
                Ok(array) => arrays.push(array),
                Err(LoadError::Missing) => {
                    return Ok(Err(Diagnostic::MissingInputFile {
                        cell,
                        seed,
                        series: s,
                        dir,
                        suffix,
                    }));
                }
                Err(LoadError::Malformed(reason)) => {
                    return Ok(Err(Diagnostic::MalformedArray { cell, path, reason }));
                }
            }
        }
        Ok(Ok(arrays))
    }

    fn tail_cell(
        &self,
        cell: CellIndex,
        value: f64,
        seed: i64,
        aggregator: QuasistationaryAggregator,
    ) -> Result<TailCell> {
        let series = [Series::PredatorPopulation, Series::PreyPopulation];
        let arrays = match self.load_cell(cell, Some(value), seed, &series)? {
            Ok(arrays) => arrays,
            Err(diagnostic) => {
                return Ok(TailCell {
                    predators: 0.0,
                    prey: 0.0,
                    present: false,
                    diagnostics: vec![diagnostic],
                });
            }
        };

        let mut diagnostics = Vec::new();
        let mut means = [0.0; 2];
        for ((s, array), mean) in series.iter().zip(&arrays).zip(means.iter_mut()) {
            let estimate = aggregator.estimate(array);
            *mean = estimate.mean;
            if estimate.samples == 0 || aggregator.is_partial(&estimate) {
                let (dir, suffix) = self.locate(Some(value), seed)?;
                let path = dir.join(format!("{}{suffix}.npy", s.stem()));
                diagnostics.push(if estimate.samples == 0 {
                    Diagnostic::MalformedArray {
                        cell,
                        path,
                        reason: "empty trajectory".to_string(),
                    }
                } else {
                    Diagnostic::ShortTrajectory {
                        cell,
                        path,
                        len: estimate.samples,
                        window: aggregator.window(),
                    }
                });
            }
        }

        Ok(TailCell {
            predators: means[0],
            prey: means[1],
            present: true,
            diagnostics,
        })
    }

    /// Tail-window means of predator and prey counts for every
    /// `(value, seed)` pair, shaped `[values.len(), seeds.len()]`
    pub fn load_tail_means(
        &self,
        values: &[f64],
        seeds: &[i64],
        aggregator: QuasistationaryAggregator,
    ) -> Result<TailMeans> {
        let shape = (values.len(), seeds.len());
        let cells = grid_cells(values.len(), seeds.len());
        let outcomes = map_cells(&cells, |cell| {
            self.tail_cell(cell, values[cell.variable], seeds[cell.seed], aggregator)
        })?;

        let mut means = TailMeans {
            predators: Array2::zeros(shape),
            prey: Array2::zeros(shape),
            present: Array2::from_elem(shape, false),
            diagnostics: Diagnostics::new(),
        };
        for (cell, outcome) in cells.iter().zip(outcomes) {
            let idx = (cell.variable, cell.seed);
            means.predators[idx] = outcome.predators;
            means.prey[idx] = outcome.prey;
            means.present[idx] = outcome.present;
            means.diagnostics.extend(outcome.diagnostics);
        }
        Ok(means)
    }
}
