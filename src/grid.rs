use crate::config::SolverConfig;

// Depth and time axes of the soil column
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub depths: Vec<f64>, // Nz+1 samples over [0, L] (meters)
    pub times: Vec<f64>,  // Nt+1 samples over [0, S] (seconds)
    pub dz: f64,
    pub dt: f64,
}

// Evenly spaced samples over [0, extent], both ends included
fn axis(extent: f64, steps: usize) -> Vec<f64> {
    (0..=steps)
        .map(|i| extent * i as f64 / steps as f64)
        .collect()
}

impl Grid {
    pub fn new(depth: f64, depth_steps: usize, period: f64, time_steps: usize) -> Self {
        Grid {
            depths: axis(depth, depth_steps),
            times: axis(period, time_steps),
            dz: depth / depth_steps as f64,
            dt: period / time_steps as f64,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Grid::new(
            config.depth,
            config.depth_steps,
            config.period,
            config.time_steps,
        )
    }

    // Nt
    pub fn time_steps(&self) -> usize {
        self.times.len() - 1
    }
}
