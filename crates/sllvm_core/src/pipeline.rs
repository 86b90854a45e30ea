//! Batch tasks over a simulator output tree
//!
//! Each task reads `seeds.txt` and the relevant value lists, aggregates every
//! cell it can load, writes its arrays through a [`ResultWriter`] and returns
//! the in-memory result together with the written paths. Per-cell problems
//! end up in the result's diagnostics; only configuration and I/O failures on
//! the batch level are errors.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayViewMut1, s};

use crate::analysis::{QuasistationaryAggregator, TimeEvolutionAggregator};
use crate::config::{AnalysisConfig, SweepArgument, SweepKey};
use crate::ensemble::{EnsembleLoader, TrajectorySource, grid_cells, map_cells, read_seeds, read_values};
use crate::error::{AnalysisError, Result};
use crate::model::{
    CellIndex, DensityEvolution, Diagnostic, Diagnostics, OptimalExponents, PopulationDensities,
    Series,
};
use crate::optimization::OptimalExponentSearch;
use crate::output::ResultWriter;

/// The available batch tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Quasistationary N and M over a parameter sweep
    Densities,
    /// Time-resolved N, M, occupancy and intactness
    Evolution,
    /// Optimal dispersal exponent over H
    Alphastar,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Densities, Task::Evolution, Task::Alphastar];

    pub fn name(self) -> &'static str {
        match self {
            Task::Densities => "densities",
            Task::Evolution => "evolution",
            Task::Alphastar => "alphastar",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Task::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| AnalysisError::Config(format!("unknown task `{s}`")))
    }
}

/// Result of one task plus the files it wrote
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub result: T,
    pub outputs: Vec<PathBuf>,
}

/// Task-independent summary, used by drivers for the final report
#[derive(Debug, Clone)]
pub struct Summary {
    pub task: Task,
    pub description: String,
    pub outputs: Vec<PathBuf>,
    pub coverage: f64,
    pub diagnostics: Diagnostics,
}

/// Value list of a sweep; a missing list is an empty sweep
fn read_value_list(path: PathBuf, diagnostics: &mut Diagnostics) -> Result<Vec<f64>> {
    match read_values(&path)? {
        Some(values) => Ok(values),
        None => {
            diagnostics.push(Diagnostic::MissingVariableList { path });
            Ok(Vec::new())
        }
    }
}

/// Quasistationary predator and prey densities over the configured sweep
///
/// Writes `N<suffix>.npy` and `M<suffix>.npy` shaped `[value, seed]`. An
/// empty sweep writes nothing.
pub fn compute_population_densities<S: TrajectorySource>(
    config: &AnalysisConfig,
    source: &S,
) -> Result<Report<PopulationDensities>> {
    let key = SweepKey::build(config)?;
    if !key.argument().has_variable() {
        return Err(AnalysisError::Config(format!(
            "densities need a swept variable, `{}` has none",
            key.argument()
        )));
    }

    let mut diagnostics = Diagnostics::new();
    let seeds = read_seeds(&key.seeds_path())?;
    let values = match key.values_path() {
        Some(path) => read_value_list(path, &mut diagnostics)?,
        None => Vec::new(),
    };
    tracing::info!(
        argument = %key.argument(),
        values = values.len(),
        seeds = seeds.len(),
        "loading {}",
        key.description()
    );

    let aggregator = QuasistationaryAggregator::new(config.tail_window);
    let mut means = EnsembleLoader::new(&key, source).load_tail_means(&values, &seeds, aggregator)?;
    diagnostics.append(&mut means.diagnostics);

    let densities = PopulationDensities {
        values,
        seeds,
        predators: means.predators,
        prey: means.prey,
        present: means.present,
        diagnostics: diagnostics.finish(),
    };

    let mut outputs = Vec::new();
    if densities.values.is_empty() {
        tracing::warn!("empty sweep, nothing written");
    } else {
        let writer = ResultWriter::new(key.results_dir());
        let suffix = format!("{}{}", key.output_suffix(), config.option_tags());
        outputs.push(writer.write("N", &suffix, &densities.predators)?);
        outputs.push(writer.write("M", &suffix, &densities.prey)?);
    }

    Ok(Report {
        result: densities,
        outputs,
    })
}

struct EvolutionCell {
    predators: Array1<f64>,
    prey: Array1<f64>,
    occupancy: Array1<f64>,
    intactness: Array1<f64>,
    present: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Copy the overlapping prefix of `src` into `dst`
fn copy_prefix(mut dst: ArrayViewMut1<f64>, src: &Array1<f64>) {
    let n = dst.len().min(src.len());
    dst.slice_mut(s![..n]).assign(&src.slice(s![..n]));
}

fn evolution_cell<S: TrajectorySource>(
    loader: &EnsembleLoader<'_, S>,
    aggregator: &TimeEvolutionAggregator,
    cell: CellIndex,
    seed: i64,
) -> Result<EvolutionCell> {
    const SERIES: [Series; 4] = [
        Series::PredatorPopulation,
        Series::PreyPopulation,
        Series::PredatorsOnHabitat,
        Series::IsolatedPatches,
    ];

    let arrays = match loader.load_cell(cell, None, seed, &SERIES)? {
        Ok(arrays) => arrays,
        Err(diagnostic) => {
            return Ok(EvolutionCell {
                predators: Array1::zeros(0),
                prey: Array1::zeros(0),
                occupancy: Array1::zeros(0),
                intactness: Array1::zeros(0),
                present: false,
                diagnostics: vec![diagnostic],
            });
        }
    };

    let samples = aggregator.samples();
    let mut diagnostics = Vec::new();
    for (series, array) in SERIES.iter().zip(&arrays) {
        if array.len() != samples {
            let (dir, suffix) = loader.locate(None, seed)?;
            diagnostics.push(Diagnostic::MalformedArray {
                cell,
                path: dir.join(format!("{}{suffix}.npy", series.stem())),
                reason: format!("expected {samples} samples, found {}", array.len()),
            });
        }
    }

    let [predators, prey, on_habitat, isolated]: [Array1<f64>; 4] = arrays
        .try_into()
        .map_err(|_| AnalysisError::Config("evolution cell is missing a series".to_string()))?;
    let occupancy = aggregator.occupancy(&on_habitat, &predators);
    let intactness = aggregator.intactness(&isolated);

    Ok(EvolutionCell {
        predators,
        prey,
        occupancy,
        intactness,
        present: true,
        diagnostics,
    })
}

/// Time-resolved populations, habitat occupancy and intactness per seed
///
/// Writes `N`, `M`, `ph` and `etah` shaped `[nmeasures + 1, seed]`.
pub fn compute_density_evolution<S: TrajectorySource>(
    config: &AnalysisConfig,
    source: &S,
) -> Result<Report<DensityEvolution>> {
    config.validate()?;
    let key = SweepKey::new(
        &config.parameters,
        SweepArgument::Evolution,
        &config.data_root,
        &config.results_root,
    );
    let seeds = read_seeds(&key.seeds_path())?;
    tracing::info!(seeds = seeds.len(), "loading {}", key.description());

    let aggregator = TimeEvolutionAggregator::new(
        config.nmeasures,
        &config.parameters,
        config.isolation_normalization,
    );
    let loader = EnsembleLoader::new(&key, source);
    let cells = grid_cells(1, seeds.len());
    let outcomes = map_cells(&cells, |cell| {
        evolution_cell(&loader, &aggregator, cell, seeds[cell.seed])
    })?;

    let shape = (aggregator.samples(), seeds.len());
    let mut evolution = DensityEvolution {
        seeds: seeds.clone(),
        predators: Array2::zeros(shape),
        prey: Array2::zeros(shape),
        occupancy: Array2::zeros(shape),
        intactness: Array2::zeros(shape),
        present: vec![false; seeds.len()],
        diagnostics: Diagnostics::new(),
    };
    for (cell, outcome) in cells.iter().zip(outcomes) {
        let j = cell.seed;
        copy_prefix(evolution.predators.column_mut(j), &outcome.predators);
        copy_prefix(evolution.prey.column_mut(j), &outcome.prey);
        copy_prefix(evolution.occupancy.column_mut(j), &outcome.occupancy);
        copy_prefix(evolution.intactness.column_mut(j), &outcome.intactness);
        evolution.present[j] = outcome.present;
        evolution.diagnostics.extend(outcome.diagnostics);
    }
    evolution.diagnostics = evolution.diagnostics.finish();

    let writer = ResultWriter::new(key.results_dir());
    let suffix = format!("{}{}", key.output_suffix(), config.evolution_tags());
    let outputs = vec![
        writer.write("N", &suffix, &evolution.predators)?,
        writer.write("M", &suffix, &evolution.prey)?,
        writer.write("ph", &suffix, &evolution.occupancy)?,
        writer.write("etah", &suffix, &evolution.intactness)?,
    ];

    Ok(Report {
        result: evolution,
        outputs,
    })
}

/// alpha* maximizing N and R for every H in `H.txt` and every seed
///
/// Reads `alpha.txt`, `H.txt` and `seeds.txt` from the alpha sweep directory
/// and writes `alphastar_N` and `alphastar_R` shaped `[H, seed]`.
pub fn compute_alphastar_vs_h<S: TrajectorySource>(
    config: &AnalysisConfig,
    source: &S,
) -> Result<Report<OptimalExponents>> {
    config.validate()?;
    let params = &config.parameters;
    let alpha_key = SweepKey::new(params, SweepArgument::Alpha, &config.data_root, &config.results_root);
    let h_key = SweepKey::new(
        params,
        SweepArgument::Fragmentation,
        &config.data_root,
        &config.results_root,
    );

    let mut diagnostics = Diagnostics::new();
    let seeds = read_seeds(&alpha_key.seeds_path())?;
    let alpha = match alpha_key.values_path() {
        Some(path) => read_value_list(path, &mut diagnostics)?,
        None => Vec::new(),
    };
    let fragmentation = match h_key.values_path() {
        Some(path) => read_value_list(path, &mut diagnostics)?,
        None => Vec::new(),
    };
    tracing::info!(
        h = fragmentation.len(),
        alpha = alpha.len(),
        seeds = seeds.len(),
        "searching alpha* for {}",
        SweepKey::alphastar_description(params)
    );

    let levels = fragmentation.len();
    let search = OptimalExponentSearch::new(config, source).with_progress(Box::new(
        move |i, h, coverage| {
            tracing::info!(h, coverage, "fragmentation level {}/{levels}", i + 1);
        },
    ));
    let mut exponents = search.search(&fragmentation, &alpha, &seeds)?;
    diagnostics.append(&mut exponents.diagnostics);
    exponents.diagnostics = diagnostics.finish();

    let mut outputs = Vec::new();
    if fragmentation.is_empty() || alpha.is_empty() {
        tracing::warn!("empty sweep, nothing written");
    } else {
        let writer = ResultWriter::new(alpha_key.results_dir());
        let suffix = format!(
            "{}{}",
            SweepKey::alphastar_output_suffix(params),
            config.option_tags()
        );
        outputs.push(writer.write("alphastar_N", &suffix, &exponents.alphastar_n)?);
        outputs.push(writer.write(
            "alphastar_R",
            &format!("{suffix}{}", config.richness_tags()),
            &exponents.alphastar_r,
        )?);
    }

    Ok(Report {
        result: exponents,
        outputs,
    })
}

/// Run one task and reduce its result to a [`Summary`]
pub fn run<S: TrajectorySource>(task: Task, config: &AnalysisConfig, source: &S) -> Result<Summary> {
    let summary = match task {
        Task::Densities => {
            let report = compute_population_densities(config, source)?;
            Summary {
                task,
                description: SweepKey::build(config)?.description().to_string(),
                coverage: report.result.coverage(),
                outputs: report.outputs,
                diagnostics: report.result.diagnostics,
            }
        }
        Task::Evolution => {
            let report = compute_density_evolution(config, source)?;
            let key = SweepKey::new(
                &config.parameters,
                SweepArgument::Evolution,
                &config.data_root,
                &config.results_root,
            );
            Summary {
                task,
                description: key.description().to_string(),
                coverage: report.result.coverage(),
                outputs: report.outputs,
                diagnostics: report.result.diagnostics,
            }
        }
        Task::Alphastar => {
            let report = compute_alphastar_vs_h(config, source)?;
            Summary {
                task,
                description: SweepKey::alphastar_description(&config.parameters),
                coverage: report.result.coverage(),
                outputs: report.outputs,
                diagnostics: report.result.diagnostics,
            }
        }
    };

    tracing::info!(
        task = %summary.task,
        outputs = summary.outputs.len(),
        coverage = summary.coverage,
        diagnostics = summary.diagnostics.len(),
        "task finished"
    );
    Ok(summary)
}
