//! Forward-time central-space update for 1D diffusion.
//! Advances the interior of a temperature field through one period. The
//! surface depth is never written; the bottom depth follows its neighbour
//! after every step.

use crate::state::TemperatureField;
use rayon::prelude::*;

#[inline(always)]
fn ftcs(above: f64, center: f64, below: f64, r: f64) -> f64 {
    center + r * (above - 2.0 * center + below)
}

// Update interior depths 1..Nz-1 of `next` from `prev`
pub fn step_interior(prev: &[f64], next: &mut [f64], r: f64) {
    let last = prev.len() - 1;
    for i in 1..last {
        next[i] = ftcs(prev[i - 1], prev[i], prev[i + 1], r);
    }
}

// Same update, interior depths split across the rayon pool
pub fn step_interior_parallel(prev: &[f64], next: &mut [f64], r: f64) {
    let last = prev.len() - 1;
    next[1..last]
        .par_iter_mut()
        .enumerate()
        .for_each(|(k, cell)| {
            let i = k + 1;
            *cell = ftcs(prev[i - 1], prev[i], prev[i + 1], r);
        });
}

/// Sweep time steps 1..=Nt in order; step t reads only row t-1.
///
/// The zero-flux bottom is carried inside the sweep so depth Nz-1 always
/// sees the current year's bottom value rather than last year's.
pub fn sweep_year(field: &mut TemperatureField, r: f64, parallel: bool) {
    for t in 1..field.time_samples() {
        let (prev, next) = field.step_rows(t);
        if parallel {
            step_interior_parallel(prev, next, r);
        } else {
            step_interior(prev, next, r);
        }
        let last = next.len() - 1;
        next[last] = next[last - 1];
    }
}
