//! Quasistationary density estimation
//!
//! The long-run density of a finite stochastic population is estimated by the
//! mean over the last `window` samples of a trajectory, which drops the
//! transient from the initial condition and averages out fluctuations.

use ndarray::{ArrayBase, Data, Ix1, s};

use crate::config::DEFAULT_TAIL_WINDOW;

/// Result of one tail average
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailEstimate {
    pub mean: f64,
    /// Number of samples that were averaged
    pub samples: usize,
}

/// Tail-window mean estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuasistationaryAggregator {
    window: usize,
}

impl Default for QuasistationaryAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_WINDOW)
    }
}

impl QuasistationaryAggregator {
    /// A window of 0 is treated as 1
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Mean of the last `window` samples, or of all samples when the
    /// trajectory is shorter. An empty trajectory gives 0 from 0 samples.
    pub fn estimate<S>(&self, series: &ArrayBase<S, Ix1>) -> TailEstimate
    where
        S: Data<Elem = f64>,
    {
        let start = series.len().saturating_sub(self.window);
        let tail = series.slice(s![start..]);
        TailEstimate {
            mean: tail.mean().unwrap_or(0.0),
            samples: tail.len(),
        }
    }

    /// Whether an estimate used fewer samples than the window
    pub fn is_partial(&self, estimate: &TailEstimate) -> bool {
        estimate.samples < self.window
    }
}
