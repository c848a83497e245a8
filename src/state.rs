use crate::grid::Grid;

// Temperature field indexed by (time step, depth step), stored row-major:
// each row is one time sample holding Nz+1 depths.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl TemperatureField {
    pub fn new(time_samples: usize, depth_samples: usize, value: f64) -> Self {
        TemperatureField {
            data: vec![value; time_samples * depth_samples],
            rows: time_samples,
            cols: depth_samples,
        }
    }

    pub fn for_grid(grid: &Grid, value: f64) -> Self {
        TemperatureField::new(grid.times.len(), grid.depths.len(), value)
    }

    pub fn time_samples(&self) -> usize {
        self.rows
    }

    pub fn depth_samples(&self) -> usize {
        self.cols
    }

    #[cfg(test)]
    pub fn get(&self, t: usize, z: usize) -> f64 {
        self.data[t * self.cols + z]
    }

    pub fn set(&mut self, t: usize, z: usize, value: f64) {
        self.data[t * self.cols + z] = value;
    }

    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.cols..(t + 1) * self.cols]
    }

    pub fn row_mut(&mut self, t: usize) -> &mut [f64] {
        &mut self.data[t * self.cols..(t + 1) * self.cols]
    }

    // Previous row (read) and current row (write) for the update at step t >= 1
    pub fn step_rows(&mut self, t: usize) -> (&[f64], &mut [f64]) {
        let (before, after) = self.data.split_at_mut(t * self.cols);
        (&before[(t - 1) * self.cols..], &mut after[..self.cols])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    // Temperature history of one depth over the whole year
    pub fn column(&self, z: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows().map(move |row| row[z])
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    // Copy the last time row into the first one
    pub fn reseed(&mut self) {
        let last = (self.rows - 1) * self.cols;
        self.data.copy_within(last.., 0);
    }

    /// Euclidean norm of `self - other` over every cell.
    pub fn l2_distance(&self, other: &TemperatureField) -> f64 {
        debug_assert_eq!(self.data.len(), other.data.len());
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}
