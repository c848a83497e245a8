use crate::boundary::{apply_surface, apply_zero_flux_bottom};
use crate::config::{SolverConfig, StabilityNumbers};
use crate::error::SolverError;
use crate::ftcs_kernel::sweep_year;
use crate::grid::Grid;
use crate::state::TemperatureField;
use serde::Serialize;

// One completed year: 1-based year count and L2 change against the year before
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceEntry {
    pub year: usize,
    pub error: f64,
}

// Append-only history of year-over-year changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvergenceTrace {
    entries: Vec<TraceEntry>,
}

impl ConvergenceTrace {
    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Converged periodic steady state: one year of temperatures over the column.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub grid: Grid,
    pub field: TemperatureField,
    pub trace: ConvergenceTrace,
    pub stability: StabilityNumbers,
}

impl SolverOutcome {
    pub fn years(&self) -> usize {
        self.trace.len()
    }

    pub fn final_error(&self) -> f64 {
        self.trace.last().map_or(f64::INFINITY, |entry| entry.error)
    }
}

/// One application of the yearly evolution operator: sweep the interior
/// through the year, enforce the zero-flux bottom, then carry the final
/// profile over as the next year's initial one.
pub fn advance_year(field: &mut TemperatureField, r: f64, parallel: bool) {
    sweep_year(field, r, parallel);
    apply_zero_flux_bottom(field);
    field.reseed();
}

#[cfg(test)]
pub fn solve(config: &SolverConfig) -> Result<SolverOutcome, SolverError> {
    solve_with_observer(config, |_| {})
}

/// Repeat yearly transitions until the change between successive years
/// falls to `config.tolerance`.
///
/// `on_year` sees every trace entry as it is recorded. Exhausting
/// `config.max_years`, or a non-finite change, yields
/// [`SolverError::Diverged`] and no field.
pub fn solve_with_observer<F>(
    config: &SolverConfig,
    mut on_year: F,
) -> Result<SolverOutcome, SolverError>
where
    F: FnMut(&TraceEntry),
{
    config.validate()?;

    let grid = Grid::from_config(config);
    let stability = config.stability();
    let r = stability.effective;

    let mut field = TemperatureField::for_grid(&grid, config.initial_temperature);
    apply_surface(&mut field, &grid, &config.surface);

    let mut trace = ConvergenceTrace::default();
    let mut remaining = config.max_years;
    let mut error = f64::INFINITY;

    while error > config.tolerance {
        let previous = field.clone();
        advance_year(&mut field, r, config.parallel);

        // Budget runs out before the year is measured
        remaining -= 1;
        if remaining == 0 {
            return Err(SolverError::Diverged {
                years: config.max_years,
                last_error: error,
            });
        }

        error = field.l2_distance(&previous);

        let entry = TraceEntry {
            year: trace.len() + 1,
            error,
        };
        trace.push(entry);
        on_year(&entry);

        if !error.is_finite() {
            return Err(SolverError::Diverged {
                years: entry.year,
                last_error: error,
            });
        }
    }

    Ok(SolverOutcome {
        grid,
        field,
        trace,
        stability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::PeriodicHalfSpace;
    use crate::boundary::surface_temperature;
    use crate::config::{SECONDS_PER_YEAR, SurfaceForcing};
    use approx::assert_abs_diff_eq;

    fn toy_config(initial_temperature: f64) -> SolverConfig {
        SolverConfig {
            depth: 1.0,
            depth_steps: 4,
            time_steps: 10,
            surface: SurfaceForcing::constant(15.0),
            initial_temperature,
            ..SolverConfig::default()
        }
    }

    // Coarse version of the reference column, converges in a few dozen years
    fn reduced_config() -> SolverConfig {
        SolverConfig {
            depth_steps: 40,
            time_steps: 500,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_uniform_toy_column_converges_immediately() {
        let outcome = solve(&toy_config(15.0)).unwrap();

        assert_eq!(outcome.years(), 1);
        assert_eq!(outcome.final_error(), 0.0);
        assert!(outcome.field.as_slice().iter().all(|&v| v == 15.0));
    }

    #[test]
    fn test_constant_surface_relaxes_to_flat_profile() {
        let config = toy_config(5.0);
        let outcome = solve(&config).unwrap();

        assert!(outcome.years() > 1);
        assert!(outcome.years() < config.max_years);
        assert!(outcome.final_error() <= config.tolerance);
        for &v in outcome.field.as_slice() {
            assert_abs_diff_eq!(v, 15.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_trace_grows_one_entry_per_year() {
        let mut seen = Vec::new();
        let outcome = solve_with_observer(&toy_config(5.0), |entry| seen.push(*entry)).unwrap();

        assert_eq!(seen.as_slice(), outcome.trace.entries());
        for (k, entry) in outcome.trace.entries().iter().enumerate() {
            assert_eq!(entry.year, k + 1);
        }
    }

    #[test]
    fn test_seasonal_forcing_converges() {
        let config = reduced_config();
        let outcome = solve(&config).unwrap();

        assert!(outcome.years() < config.max_years);
        assert!(outcome.final_error() <= config.tolerance);
        assert!(outcome.stability.is_clamped());
        assert!(outcome.trace.entries().iter().all(|e| e.error.is_finite()));

        // geometric decay once the slowest mode dominates
        let entries = outcome.trace.entries();
        assert!(entries.len() >= 5);
        for pair in entries[entries.len() - 5..].windows(2) {
            assert!(pair[1].error <= pair[0].error, "trace tail increased: {:?}", pair);
        }
    }

    #[test]
    fn test_converged_field_boundaries() {
        let config = reduced_config();
        let outcome = solve(&config).unwrap();
        let field = &outcome.field;
        let bottom = field.depth_samples() - 1;

        for (t, &time) in outcome.grid.times.iter().enumerate() {
            assert_eq!(field.get(t, bottom), field.get(t, bottom - 1));
            let expected = 15.0 - 10.0 * (2.0 * std::f64::consts::PI * time / SECONDS_PER_YEAR).sin();
            assert_abs_diff_eq!(field.get(t, 0), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_converged_field_is_fixed_point() {
        let config = reduced_config();
        let outcome = solve(&config).unwrap();

        let mut next = outcome.field.clone();
        advance_year(&mut next, outcome.stability.effective, false);

        assert!(next.l2_distance(&outcome.field) <= config.tolerance);
    }

    #[test]
    fn test_converged_field_matches_half_space() {
        let config = reduced_config();
        let outcome = solve(&config).unwrap();
        let reference = PeriodicHalfSpace::for_solver(&config);

        // upper half of the column, well clear of the zero-flux bottom
        let max_diff = outcome
            .grid
            .times
            .iter()
            .enumerate()
            .flat_map(|(t, &time)| {
                let field = &outcome.field;
                let depths = &outcome.grid.depths;
                (0..=20).map(move |z| (field.get(t, z) - reference.temperature(depths[z], time)).abs())
            })
            .fold(0.0, f64::max);

        assert!(max_diff < 0.25, "max deviation from half-space solution: {}", max_diff);
    }

    #[test]
    fn test_advance_year_reseeds_from_last_row() {
        let config = reduced_config();
        let grid = Grid::from_config(&config);
        let mut field = TemperatureField::for_grid(&grid, config.initial_temperature);
        crate::boundary::apply_surface(&mut field, &grid, &config.surface);

        for _ in 0..3 {
            advance_year(&mut field, config.stability().effective, false);
            let last = field.time_samples() - 1;
            assert_eq!(field.row(0), field.row(last));
        }
    }

    #[test]
    fn test_surface_row_survives_iterations() {
        let config = toy_config(5.0);
        let config = SolverConfig {
            surface: SurfaceForcing::default(),
            ..config
        };
        let outcome = solve(&config).unwrap();

        for (t, &time) in outcome.grid.times.iter().enumerate() {
            assert_abs_diff_eq!(
                outcome.field.get(t, 0),
                surface_temperature(&config.surface, config.period, time),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_parallel_solve_matches_sequential() {
        let sequential = solve(&reduced_config()).unwrap();
        let parallel = solve(&SolverConfig {
            parallel: true,
            ..reduced_config()
        })
        .unwrap();

        assert_eq!(sequential.field, parallel.field);
        assert_eq!(sequential.trace, parallel.trace);
    }

    #[test]
    fn test_iteration_cap_is_fatal() {
        let config = SolverConfig {
            max_years: 3,
            ..reduced_config()
        };

        let err = solve(&config).unwrap_err();
        assert!(matches!(err, SolverError::Diverged { years: 3, .. }));
    }

    #[test]
    fn test_invalid_config_rejected_before_stepping() {
        let config = SolverConfig {
            stability_clamp: Some(0.75),
            ..reduced_config()
        };

        let mut calls = 0;
        let err = solve_with_observer(&config, |_| calls += 1).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig(_)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_two_year_budget_allows_one_measured_year() {
        let config = SolverConfig {
            max_years: 2,
            ..toy_config(15.0)
        };

        let outcome = solve(&config).unwrap();
        assert_eq!(outcome.years(), 1);
    }

    #[test]
    fn test_finer_seasonal_column_converges_well_within_budget() {
        // a bottom lagging a year behind would need thousands of years here
        let config = SolverConfig {
            depth_steps: 100,
            time_steps: 1250,
            ..SolverConfig::default()
        };

        let outcome = solve(&config).unwrap();

        assert!(outcome.years() < 250, "took {} years", outcome.years());
        assert!(outcome.final_error() <= config.tolerance);
        let bottom = outcome.field.depth_samples() - 1;
        for t in 0..outcome.field.time_samples() {
            assert_eq!(outcome.field.get(t, bottom), outcome.field.get(t, bottom - 1));
        }
    }

    #[test]
    #[ignore = "full reference grid, a few hundred years of 5000 x 401 sweeps; run with --release"]
    fn test_reference_grid_converges() {
        let config = SolverConfig::default();
        let outcome = solve(&config).unwrap();

        assert!(outcome.years() < 500);
        assert!(outcome.final_error() <= 1e-4);
        assert_eq!(outcome.field.time_samples(), 5001);
        assert_eq!(outcome.field.depth_samples(), 401);
    }
}
