//! Periodic steady state of a semi-infinite half-space under sinusoidal
//! surface forcing:
//!
//!   T(z, t) = mean - A·e^(-z/d)·sin(ωt - z/d),   ω = 2π/S,   d = √(2K/ω)
//!
//! The column solver models a finite depth with a zero-flux bottom, so the two
//! agree once the column is several damping depths deep.

use crate::config::{SolverConfig, SurfaceForcing};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicHalfSpace {
    pub forcing: SurfaceForcing,
    pub period: f64,
    pub diffusivity: f64,
}

impl PeriodicHalfSpace {
    pub fn new(forcing: SurfaceForcing, period: f64, diffusivity: f64) -> Self {
        PeriodicHalfSpace {
            forcing,
            period,
            diffusivity,
        }
    }

    /// Reference for a solver run, using the diffusivity the clamped update
    /// actually models rather than the configured one.
    pub fn for_solver(config: &SolverConfig) -> Self {
        PeriodicHalfSpace::new(config.surface, config.period, config.effective_diffusivity())
    }

    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI / self.period
    }

    /// Depth at which the seasonal amplitude falls to 1/e of the surface value.
    pub fn damping_depth(&self) -> f64 {
        (2.0 * self.diffusivity / self.angular_frequency()).sqrt()
    }

    pub fn amplitude_at(&self, z: f64) -> f64 {
        self.forcing.amplitude * (-z / self.damping_depth()).exp()
    }

    // Phase delay in seconds relative to the surface
    pub fn lag_at(&self, z: f64) -> f64 {
        z / self.damping_depth() / self.angular_frequency()
    }

    #[cfg(test)]
    pub fn temperature(&self, z: f64, t: f64) -> f64 {
        let d = self.damping_depth();
        self.forcing.mean - self.amplitude_at(z) * (self.angular_frequency() * t - z / d).sin()
    }
}
