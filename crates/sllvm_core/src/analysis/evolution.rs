//! Time-resolved habitat metrics of a single trajectory

use ndarray::{Array1, ArrayBase, Data, Ix1, Zip, s};

use crate::config::{IsolationNormalization, ParameterSet};
use crate::numeric::guarded_div;

/// Builds occupancy and habitat-intactness series for evolution runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeEvolutionAggregator {
    nmeasures: usize,
    capacity: f64,
    late_capacity: f64,
}

impl TimeEvolutionAggregator {
    pub fn new(
        nmeasures: usize,
        params: &ParameterSet,
        normalization: IsolationNormalization,
    ) -> Self {
        let capacity = params.habitat_capacity();
        let late_capacity = match normalization {
            IsolationNormalization::Constant => capacity,
            IsolationNormalization::SplitHorizon { late_factor } => {
                guarded_div(capacity, late_factor)
            }
        };
        Self {
            nmeasures,
            capacity,
            late_capacity,
        }
    }

    /// Samples per trajectory: the initial state plus one per measurement
    pub fn samples(&self) -> usize {
        self.nmeasures + 1
    }

    /// First sample index normalized by the late-horizon capacity
    fn split_index(&self) -> usize {
        self.nmeasures / 2 + 1
    }

    /// Fraction of predators on habitat, 0 where there are no predators.
    /// The result has the length of the shorter input.
    pub fn occupancy<S1, S2>(
        &self,
        on_habitat: &ArrayBase<S1, Ix1>,
        predators: &ArrayBase<S2, Ix1>,
    ) -> Array1<f64>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        let len = on_habitat.len().min(predators.len());
        Zip::from(on_habitat.slice(s![..len]))
            .and(predators.slice(s![..len]))
            .map_collect(|&h, &n| guarded_div(h, n))
    }

    /// Habitat intactness 1 - cumsum(isolated) / capacity
    pub fn intactness<S>(&self, isolated: &ArrayBase<S, Ix1>) -> Array1<f64>
    where
        S: Data<Elem = f64>,
    {
        let split = self.split_index();
        let mut cumulative = 0.0;
        isolated
            .iter()
            .enumerate()
            .map(|(t, &count)| {
                cumulative += count;
                let capacity = if t < split {
                    self.capacity
                } else {
                    self.late_capacity
                };
                1.0 - guarded_div(cumulative, capacity)
            })
            .collect()
    }
}
