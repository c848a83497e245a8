use crate::config::SurfaceForcing;
use crate::grid::Grid;
use crate::state::TemperatureField;
use std::f64::consts::PI;

/// Surface (Dirichlet) temperature at absolute time `t` within a forcing period.
///
/// `surface(t) = mean - amplitude * sin(2πt / period)`; depends only on time
/// of year, so the same row serves every simulated year.
pub fn surface_temperature(forcing: &SurfaceForcing, period: f64, t: f64) -> f64 {
    forcing.mean - forcing.amplitude * (2.0 * PI * t / period).sin()
}

// Fill depth index 0 for every time sample
pub fn apply_surface(field: &mut TemperatureField, grid: &Grid, forcing: &SurfaceForcing) {
    let period = grid.times[grid.time_steps()];
    for (t, &time) in grid.times.iter().enumerate() {
        field.set(t, 0, surface_temperature(forcing, period, time));
    }
}

/// Zero-flux (Neumann) bottom: depth index Nz takes the value of Nz-1 at
/// every time sample. The yearly sweep already carries this for each step it
/// computes; this pass enforces it over the whole year, including row 0.
// TODO: fixed-temperature (Dirichlet) bottom as an alternative to zero flux
pub fn apply_zero_flux_bottom(field: &mut TemperatureField) {
    let bottom = field.depth_samples() - 1;
    for t in 0..field.time_samples() {
        let row = field.row_mut(t);
        row[bottom] = row[bottom - 1];
    }
}
