use crate::grid::Grid;
use crate::state::TemperatureField;
use serde::Serialize;

// Annual temperature range at one depth of the converged year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeRow {
    pub depth_m: f64,
    pub min_c: f64,
    pub mean_c: f64,
    pub max_c: f64,
}

impl EnvelopeRow {
    pub fn swing(&self) -> f64 {
        self.max_c - self.min_c
    }
}

/// Per-depth minimum, mean and maximum over one converged year.
///
/// The last time sample repeats the first once the year has been re-seeded,
/// so the mean skips it.
pub fn depth_envelope(grid: &Grid, field: &TemperatureField) -> Vec<EnvelopeRow> {
    let samples = field.time_samples().saturating_sub(1).max(1);

    grid.depths
        .iter()
        .enumerate()
        .map(|(z, &depth_m)| {
            let mut min_c = f64::INFINITY;
            let mut max_c = f64::NEG_INFINITY;
            for v in field.column(z) {
                min_c = min_c.min(v);
                max_c = max_c.max(v);
            }
            let mean_c = field.column(z).take(samples).sum::<f64>() / samples as f64;
            EnvelopeRow {
                depth_m,
                min_c,
                mean_c,
                max_c,
            }
        })
        .collect()
}
