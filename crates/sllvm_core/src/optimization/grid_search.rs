//! Exhaustive (H, alpha) sweep for the optimal dispersal exponent
//!
//! For every fragmentation level H the quasistationary predator density N
//! and species richness R are evaluated on the full alpha grid of each seed.
//! alpha* is the grid value at the first maximum, so ties and all-zero
//! columns resolve to the smallest alpha.

use ndarray::{Array2, Array3, ArrayBase, Axis, Data, Ix1, s};

use crate::analysis::{QuasistationaryAggregator, richness};
use crate::config::{AnalysisConfig, SweepArgument, SweepKey};
use crate::ensemble::{EnsembleLoader, TrajectorySource};
use crate::error::Result;
use crate::model::{Diagnostics, OptimalExponents};

/// Called after each H level with `(index, H, coverage of that level)`
pub type ProgressCallback = Box<dyn Fn(usize, f64, f64) + Send + Sync>;

/// Index of the first maximum, `None` for an empty series.
/// NaN entries never win.
pub fn first_argmax<S>(series: &ArrayBase<S, Ix1>) -> Option<usize>
where
    S: Data<Elem = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in series.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b || v.is_nan() => {}
            None if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// alpha at the first maximum of every column of a `[alpha, seed]` matrix.
/// Columns without a maximum give 0.
fn alphastar_per_seed<S>(alpha: &[f64], objective: &ArrayBase<S, ndarray::Ix2>) -> Vec<f64>
where
    S: Data<Elem = f64>,
{
    objective
        .axis_iter(Axis(1))
        .map(|column| first_argmax(&column).map_or(0.0, |i| alpha[i]))
        .collect()
}

/// Locates alpha* over a grid of fragmentation levels
pub struct OptimalExponentSearch<'a, S: TrajectorySource> {
    config: &'a AnalysisConfig,
    source: &'a S,
    progress: Option<ProgressCallback>,
}

impl<'a, S: TrajectorySource> OptimalExponentSearch<'a, S> {
    pub fn new(config: &'a AnalysisConfig, source: &'a S) -> Self {
        Self {
            config,
            source,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// alpha*_N and alpha*_R over `[H, seed]`.
    ///
    /// Each H level is loaded through the alpha-mode key derived for that H;
    /// every other parameter comes from the configuration.
    pub fn search(
        &self,
        fragmentation: &[f64],
        alpha: &[f64],
        seeds: &[i64],
    ) -> Result<OptimalExponents> {
        let aggregator = QuasistationaryAggregator::new(self.config.tail_window);
        let q = self.config.diversity_order;

        let mut result = OptimalExponents {
            fragmentation: fragmentation.to_vec(),
            alpha: alpha.to_vec(),
            seeds: seeds.to_vec(),
            alphastar_n: Array2::zeros((fragmentation.len(), seeds.len())),
            alphastar_r: Array2::zeros((fragmentation.len(), seeds.len())),
            present: Array3::from_elem((fragmentation.len(), alpha.len(), seeds.len()), false),
            diagnostics: Diagnostics::new(),
        };

        for (i, &h) in fragmentation.iter().enumerate() {
            let key = SweepKey::new(
                &self.config.parameters.with_fragmentation(h),
                SweepArgument::Alpha,
                &self.config.data_root,
                &self.config.results_root,
            );
            let loader = EnsembleLoader::new(&key, self.source);
            let means = loader.load_tail_means(alpha, seeds, aggregator)?;
            let r = richness(&means.predators, &means.prey, q)?;

            let star_n = alphastar_per_seed(alpha, &means.predators);
            let star_r = alphastar_per_seed(alpha, &r);
            for (j, (n, r)) in star_n.into_iter().zip(star_r).enumerate() {
                result.alphastar_n[(i, j)] = n;
                result.alphastar_r[(i, j)] = r;
            }
            result
                .present
                .slice_mut(s![i, .., ..])
                .assign(&means.present);

            let loaded = means.present.iter().filter(|&&p| p).count();
            let coverage = if means.present.is_empty() {
                0.0
            } else {
                loaded as f64 / means.present.len() as f64
            };
            tracing::debug!(h, loaded, total = means.present.len(), "fragmentation level done");
            if let Some(callback) = &self.progress {
                callback(i, h, coverage);
            }

            result
                .diagnostics
                .extend(means.diagnostics.into_iter().map(|d| d.with_outer(i)));
        }

        result.diagnostics = result.diagnostics.finish();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ensemble::LoadError;
    use crate::model::Series;
    use ndarray::{Array1, array};

    #[derive(Default)]
    struct MemorySource {
        arrays: HashMap<PathBuf, Array1<f64>>,
    }

    impl TrajectorySource for MemorySource {
        fn load(&self, path: &Path) -> std::result::Result<Array1<f64>, LoadError> {
            self.arrays.get(path).cloned().ok_or(LoadError::Missing)
        }
    }

    impl MemorySource {
        fn insert(&mut self, config: &AnalysisConfig, h: f64, alpha: f64, seed: i64, n: f64, m: f64) {
            let key = SweepKey::new(
                &config.parameters.with_fragmentation(h),
                SweepArgument::Alpha,
                &config.data_root,
                &config.results_root,
            );
            let dir = key.data_dir(Some(alpha));
            let suffix = key.input_suffix().resolve(Some(alpha), seed).unwrap();
            for (series, v) in [(Series::PredatorPopulation, n), (Series::PreyPopulation, m)] {
                self.arrays.insert(
                    dir.join(format!("{}{suffix}.npy", series.stem())),
                    Array1::from_elem(60, v),
                );
            }
        }
    }

    #[test]
    fn test_first_argmax_prefers_first_occurrence() {
        assert_eq!(first_argmax(&array![1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(first_argmax(&array![0.0, 0.0, 0.0]), Some(0));
        assert_eq!(first_argmax(&array![f64::NAN, 1.0]), Some(1));
        assert_eq!(first_argmax(&Array1::<f64>::zeros(0)), None);
    }

    #[test]
    fn test_alphastar_per_seed_on_density_matrix() {
        let alpha = [0.5, 1.0, 1.5];
        let n = array![[1.0, 2.0], [5.0, 2.0], [3.0, 2.0]];
        assert_eq!(alphastar_per_seed(&alpha, &n), vec![1.0, 0.5]);
    }

    #[test]
    fn test_search_locates_alphastar_per_level_and_seed() {
        let config = AnalysisConfig::default();
        let alpha = [0.5, 1.0, 1.5];
        let seeds = [1, 2];
        let mut source = MemorySource::default();

        // H = 0.1: N peaks at alpha 1.0 for seed 1, flat for seed 2.
        // R weighs evenness by total abundance.
        let h = 0.1;
        for (a, n1, m1, n2, m2) in [
            (0.5, 1.0, 9.0, 2.0, 2.0),
            (1.0, 5.0, 20.0, 2.0, 0.0),
            (1.5, 3.0, 3.0, 2.0, 8.0),
        ] {
            source.insert(&config, h, a, 1, n1, m1);
            source.insert(&config, h, a, 2, n2, m2);
        }
        // H = 0.9: everything missing for seed 2
        for (a, n) in [(0.5, 1.0), (1.0, 1.0), (1.5, 4.0)] {
            source.insert(&config, 0.9, a, 1, n, n);
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let result = OptimalExponentSearch::new(&config, &source)
            .with_progress(Box::new(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .search(&[h, 0.9], &alpha, &seeds)
            .unwrap();

        assert_eq!(result.alphastar_n, array![[1.0, 0.5], [1.5, 0.5]]);
        // seed 1 at H=0.1: R = (D-1)(N+M) is largest for (5, 20)
        // seed 2 at H=0.1: R = 4 for (2, 2), about 6.5 for (2, 8), 0 for (2, 0)
        assert_eq!(result.alphastar_r[(0, 0)], 1.0);
        assert_eq!(result.alphastar_r[(0, 1)], 1.5);
        assert_eq!(result.alphastar_r[(1, 0)], 1.5);
        assert_eq!(result.alphastar_r[(1, 1)], 0.5);

        assert_eq!(result.present.shape(), &[2, 3, 2]);
        assert!(!result.present[(1, 2, 1)]);
        assert_eq!(result.diagnostics.missing_count(), 3);
        assert!(
            result
                .diagnostics
                .iter()
                .all(|d| d.cell().is_some_and(|c| c.outer == 1 && c.seed == 1))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_search_without_levels_is_empty() {
        let config = AnalysisConfig::default();
        let source = MemorySource::default();
        let result = OptimalExponentSearch::new(&config, &source)
            .search(&[], &[1.0, 2.0], &[1, 2, 3])
            .unwrap();
        assert_eq!(result.alphastar_n.shape(), &[0, 3]);
        assert!(result.diagnostics.is_empty());
    }
}
