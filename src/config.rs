use crate::error::SolverError;

pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

// Stability number used in place of the physically derived one
pub const DEFAULT_STABILITY_CLAMP: f64 = 0.499;

// Explicit diffusion is unstable at or above this number
pub const STABILITY_LIMIT: f64 = 0.5;

// Seasonal surface forcing: surface(t) = mean - amplitude * sin(2πt / period)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceForcing {
    pub mean: f64,
    pub amplitude: f64,
}

impl SurfaceForcing {
    pub fn new(mean: f64, amplitude: f64) -> Self {
        SurfaceForcing { mean, amplitude }
    }

    // Constant surface temperature
    #[cfg(test)]
    pub fn constant(value: f64) -> Self {
        SurfaceForcing {
            mean: value,
            amplitude: 0.0,
        }
    }
}

impl Default for SurfaceForcing {
    fn default() -> Self {
        SurfaceForcing::new(15.0, 10.0)
    }
}

// Solver inputs for one soil column run
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Column depth L in meters
    pub depth: f64,
    /// Number of depth steps Nz (the axis holds Nz+1 samples)
    pub depth_steps: usize,
    /// Forcing period S in seconds
    pub period: f64,
    /// Number of time steps Nt per period (the axis holds Nt+1 samples)
    pub time_steps: usize,
    /// Thermal diffusivity K in m²/s
    pub diffusivity: f64,
    /// Overrides the physically derived stability number when set
    pub stability_clamp: Option<f64>,
    /// Uniform initial temperature in °C
    pub initial_temperature: f64,
    pub surface: SurfaceForcing,
    /// Year-over-year L2 change at or below which the cycle is periodic
    pub tolerance: f64,
    /// Iteration budget; exhausting it is fatal
    pub max_years: usize,
    /// Sweep the depth axis with rayon
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            depth: 100.0,
            depth_steps: 400,
            period: SECONDS_PER_YEAR,
            time_steps: 5000,
            diffusivity: 1e-6,
            stability_clamp: Some(DEFAULT_STABILITY_CLAMP),
            initial_temperature: 15.0,
            surface: SurfaceForcing::default(),
            tolerance: 1e-4,
            max_years: 500,
            parallel: false,
        }
    }
}

// Physically derived stability number alongside the one that drives the update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityNumbers {
    /// K * dt / dz²
    pub physical: f64,
    /// Value used by the explicit update
    pub effective: f64,
}

impl StabilityNumbers {
    pub fn is_clamped(&self) -> bool {
        self.physical != self.effective
    }
}

impl SolverConfig {
    pub fn dz(&self) -> f64 {
        self.depth / self.depth_steps as f64
    }

    pub fn dt(&self) -> f64 {
        self.period / self.time_steps as f64
    }

    pub fn stability(&self) -> StabilityNumbers {
        let dz = self.dz();
        let physical = self.diffusivity * self.dt() / (dz * dz);
        StabilityNumbers {
            physical,
            effective: self.stability_clamp.unwrap_or(physical),
        }
    }

    /// Diffusivity actually modelled by the update, `effective * dz² / dt`.
    ///
    /// Differs from `diffusivity` whenever the stability number is clamped.
    pub fn effective_diffusivity(&self) -> f64 {
        let dz = self.dz();
        self.stability().effective * dz * dz / self.dt()
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        let invalid = |msg: String| Err(SolverError::InvalidConfig(msg));

        if self.depth_steps < 2 {
            return invalid(format!(
                "depth steps must be at least 2, got {}",
                self.depth_steps
            ));
        }
        if self.time_steps < 1 {
            return invalid("time steps must be at least 1".to_string());
        }
        if !(self.depth.is_finite() && self.depth > 0.0) {
            return invalid(format!("depth must be positive, got {}", self.depth));
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            return invalid(format!("period must be positive, got {}", self.period));
        }
        if !(self.diffusivity.is_finite() && self.diffusivity >= 0.0) {
            return invalid(format!(
                "diffusivity must be non-negative, got {}",
                self.diffusivity
            ));
        }

        let r = self.stability().effective;
        if !(r.is_finite() && (0.0..STABILITY_LIMIT).contains(&r)) {
            return invalid(format!(
                "stability number {} is outside [0, {})",
                r, STABILITY_LIMIT
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            ));
        }
        // the budget is spent before each year is measured
        if self.max_years < 2 {
            return invalid(format!(
                "max years must be at least 2 for one measured year, got {}",
                self.max_years
            ));
        }
        if ![
            self.initial_temperature,
            self.surface.mean,
            self.surface.amplitude,
        ]
        .iter()
        .all(|v| v.is_finite())
        {
            return invalid("temperatures and amplitude must be finite".to_string());
        }

        Ok(())
    }
}
