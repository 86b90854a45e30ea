//! Aggregated sweep results
//!
//! Matrices follow the simulator's convention: rows are the swept value (or
//! time for evolution runs), columns are seeds in `seeds.txt` order. Cells
//! without backing data hold 0 and are `false` in the accompanying mask.

use ndarray::{Array1, Array2, Array3, Axis};

use super::Diagnostics;

/// Per-seed array written by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    PredatorPopulation,
    PreyPopulation,
    PredatorsOnHabitat,
    IsolatedPatches,
}

impl Series {
    /// File name stem, the suffix follows directly
    pub fn stem(self) -> &'static str {
        match self {
            Series::PredatorPopulation => "pred_population",
            Series::PreyPopulation => "prey_population",
            Series::PredatorsOnHabitat => "predators_on_habitat",
            Series::IsolatedPatches => "isolated_patches",
        }
    }
}

/// Quasistationary predator (N) and prey (M) densities over `[value, seed]`
#[derive(Debug, Clone)]
pub struct PopulationDensities {
    pub values: Vec<f64>,
    pub seeds: Vec<i64>,
    pub predators: Array2<f64>,
    pub prey: Array2<f64>,
    pub present: Array2<bool>,
    pub diagnostics: Diagnostics,
}

impl PopulationDensities {
    /// Fraction of cells that loaded
    pub fn coverage(&self) -> f64 {
        coverage(self.present.iter().copied())
    }

    /// Ensemble means per swept value over loaded seeds only
    pub fn present_means(&self) -> (Array1<f64>, Array1<f64>) {
        (
            present_mean(&self.predators, &self.present),
            present_mean(&self.prey, &self.present),
        )
    }
}

/// Time-resolved series over `[sample, seed]`
#[derive(Debug, Clone)]
pub struct DensityEvolution {
    pub seeds: Vec<i64>,
    pub predators: Array2<f64>,
    pub prey: Array2<f64>,
    /// Fraction of predators located on habitat
    pub occupancy: Array2<f64>,
    /// One minus the normalized cumulative count of isolated patches
    pub intactness: Array2<f64>,
    /// Per seed, whether every series loaded
    pub present: Vec<bool>,
    pub diagnostics: Diagnostics,
}

impl DensityEvolution {
    pub fn coverage(&self) -> f64 {
        coverage(self.present.iter().copied())
    }
}

/// Optimal dispersal exponents over `[H, seed]`
#[derive(Debug, Clone)]
pub struct OptimalExponents {
    pub fragmentation: Vec<f64>,
    pub alpha: Vec<f64>,
    pub seeds: Vec<i64>,
    /// alpha maximizing the predator density
    pub alphastar_n: Array2<f64>,
    /// alpha maximizing species richness
    pub alphastar_r: Array2<f64>,
    /// `[H, alpha, seed]`
    pub present: Array3<bool>,
    pub diagnostics: Diagnostics,
}

impl OptimalExponents {
    pub fn coverage(&self) -> f64 {
        coverage(self.present.iter().copied())
    }
}

fn coverage(flags: impl Iterator<Item = bool>) -> f64 {
    let (loaded, total) = flags.fold((0usize, 0usize), |(l, t), f| (l + f as usize, t + 1));
    if total == 0 {
        0.0
    } else {
        loaded as f64 / total as f64
    }
}

/// Row means of `matrix` counting only cells flagged in `present`.
/// Rows with no loaded cell are 0.
pub fn present_mean(matrix: &Array2<f64>, present: &Array2<bool>) -> Array1<f64> {
    matrix
        .axis_iter(Axis(0))
        .zip(present.axis_iter(Axis(0)))
        .map(|(row, mask)| {
            let (sum, count) = row
                .iter()
                .zip(mask.iter())
                .filter(|&(_, &p)| p)
                .fold((0.0, 0usize), |(s, c), (&v, _)| (s + v, c + 1));
            crate::numeric::guarded_div(sum, count as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_present_mean_skips_missing_cells() {
        let matrix = array![[1.0, 0.0, 3.0], [0.0, 0.0, 0.0]];
        let present = array![[true, false, true], [false, false, false]];
        let means = present_mean(&matrix, &present);
        assert_eq!(means, array![2.0, 0.0]);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage([true, false, true, true].into_iter()), 0.75);
        assert_eq!(coverage(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_series_stems() {
        assert_eq!(Series::PredatorPopulation.stem(), "pred_population");
        assert_eq!(Series::PreyPopulation.stem(), "prey_population");
        assert_eq!(Series::PredatorsOnHabitat.stem(), "predators_on_habitat");
        assert_eq!(Series::IsolatedPatches.stem(), "isolated_patches");
    }
}
