use thiserror::Error;

/// Errors surfaced by the soil column solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("Unstable: max iterations reached after {years} years (last error: {last_error:.3e})")]
    Diverged { years: usize, last_error: f64 },
}
