//! Hill diversity and species richness of the two-species community
//!
//! With relative abundances p_N = N/(N+M) and p_M = M/(N+M):
//!
//! - q = 1: D = exp(-p_N ln p_N - p_M ln p_M)
//! - q ≠ 1: D = (Σ p_i^q)^(1/(1-q)), summed over species that are present
//!
//! and richness R = (D - 1)(N + M). A monoculture has D = 1 and R = 0 for
//! every order. Cells without any individuals resolve to D = 1 (q = 1) or
//! D = 0 (q ≠ 1); both give R = 0.

use ndarray::{Array, ArrayBase, Data, Dimension, Zip};

use crate::error::{AnalysisError, Result};
use crate::numeric::{finite_or_zero, guarded_div, guarded_pow, xlogx};

/// Hill diversity of a single (N, M) pair
pub fn true_diversity_cell(n: f64, m: f64, q: f64) -> f64 {
    let total = n + m;
    let p_n = guarded_div(n, total);
    let p_m = guarded_div(m, total);

    if q == 1.0 {
        return finite_or_zero((-(xlogx(p_n) + xlogx(p_m))).exp());
    }

    let sum: f64 = [p_n, p_m]
        .into_iter()
        .filter(|&p| p > 0.0)
        .map(|p| p.powf(q))
        .sum();
    if sum == 0.0 {
        return 0.0;
    }
    guarded_pow(sum, 1.0 / (1.0 - q))
}

/// Species richness of a single (N, M) pair
pub fn richness_cell(n: f64, m: f64, q: f64) -> f64 {
    finite_or_zero((true_diversity_cell(n, m, q) - 1.0) * (n + m))
}

fn check_shapes<S1, S2, D>(n: &ArrayBase<S1, D>, m: &ArrayBase<S2, D>) -> Result<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    if n.shape() != m.shape() {
        return Err(AnalysisError::Config(format!(
            "abundance arrays differ in shape: {:?} vs {:?}",
            n.shape(),
            m.shape()
        )));
    }
    Ok(())
}

/// Elementwise Hill diversity of order `q`
pub fn true_diversity<S1, S2, D>(
    n: &ArrayBase<S1, D>,
    m: &ArrayBase<S2, D>,
    q: f64,
) -> Result<Array<f64, D>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_shapes(n, m)?;
    Ok(Zip::from(n)
        .and(m)
        .map_collect(|&n, &m| true_diversity_cell(n, m, q)))
}

/// Elementwise species richness R = (D - 1)(N + M)
pub fn richness<S1, S2, D>(
    n: &ArrayBase<S1, D>,
    m: &ArrayBase<S2, D>,
    q: f64,
) -> Result<Array<f64, D>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_shapes(n, m)?;
    Ok(Zip::from(n)
        .and(m)
        .map_collect(|&n, &m| richness_cell(n, m, q)))
}
