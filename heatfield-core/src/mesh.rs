//! Field storage for the square mesh.
//!
//! All fields are flat `Vec<f64>` in row-major order, `y * n + x`. The
//! temperature field is double buffered: the diffusion pass writes the
//! scratch buffer and then swaps it in, so both buffers are allocated once
//! and never resized.

use crate::config::MIN_STENCIL_GRID;
use crate::sources::HeatSource;

#[derive(Debug, Clone)]
pub struct MeshState {
    n: usize,
    temperature: Vec<f64>,
    scratch: Vec<f64>,
    eikonal: Vec<f64>,
    speed: Vec<f64>,
}

impl MeshState {
    /// Mesh at uniform `ambient` temperature, infinite distances and uniform `speed`.
    ///
    /// `n` is raised to the smallest mesh the stencil can step.
    pub fn new(n: usize, ambient: f64, speed: f64) -> Self {
        let n = n.max(MIN_STENCIL_GRID);
        let size = n * n;
        Self {
            n,
            temperature: vec![ambient; size],
            scratch: vec![ambient; size],
            eikonal: vec![f64::INFINITY; size],
            speed: vec![speed; size],
        }
    }

    /// Restore the construction state without reallocating.
    pub fn reinitialize(&mut self, ambient: f64, speed: f64) {
        self.temperature.fill(ambient);
        self.scratch.fill(ambient);
        self.eikonal.fill(f64::INFINITY);
        self.speed.fill(speed);
    }

    // ---- Geometry ----

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.n && y < self.n
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.n + x
    }

    // ---- Read accessors ----

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn eikonal(&self) -> &[f64] {
        &self.eikonal
    }

    pub fn speed(&self) -> &[f64] {
        &self.speed
    }

    pub fn temperature_at(&self, x: usize, y: usize) -> Option<f64> {
        self.contains(x, y).then(|| self.temperature[self.index(x, y)])
    }

    pub fn eikonal_at(&self, x: usize, y: usize) -> Option<f64> {
        self.contains(x, y).then(|| self.eikonal[self.index(x, y)])
    }

    pub fn speed_at(&self, x: usize, y: usize) -> Option<f64> {
        self.contains(x, y).then(|| self.speed[self.index(x, y)])
    }

    pub fn max_temperature(&self, floor: f64) -> f64 {
        self.temperature.iter().copied().fold(floor, f64::max)
    }

    // ---- Writers ----

    /// Overwrite one temperature cell. Out-of-range coordinates are ignored.
    pub fn set_temperature(&mut self, x: usize, y: usize, value: f64) {
        if self.contains(x, y) {
            let i = self.index(x, y);
            self.temperature[i] = value;
        }
    }

    /// Override the propagation speed of one cell.
    ///
    /// Only positive finite speeds are accepted; returns whether the value was stored.
    pub fn set_speed(&mut self, x: usize, y: usize, speed: f64) -> bool {
        if !self.contains(x, y) || !speed.is_finite() || speed <= 0.0 {
            return false;
        }
        let i = self.index(x, y);
        self.speed[i] = speed;
        true
    }

    /// Pin a source into both fields: its temperature and a zero arrival time.
    pub(crate) fn stamp_source(&mut self, source: &HeatSource) {
        let i = self.index(source.x, source.y);
        self.temperature[i] = source.temperature;
        self.eikonal[i] = 0.0;
    }

    /// Current field for reading and scratch field for writing, borrowed together.
    pub(crate) fn diffusion_buffers(&mut self) -> (&[f64], &mut [f64]) {
        (&self.temperature, &mut self.scratch)
    }

    pub(crate) fn swap_temperature(&mut self) {
        std::mem::swap(&mut self.temperature, &mut self.scratch);
    }

    pub(crate) fn eikonal_buffers(&mut self) -> (&mut [f64], &[f64]) {
        (&mut self.eikonal, &self.speed)
    }

    pub(crate) fn blend_buffers(&mut self) -> (&mut [f64], &[f64]) {
        (&mut self.temperature, &self.eikonal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_mesh_is_uniform() {
        let m = MeshState::new(4, 20.0, 2.0);
        assert_eq!(m.temperature().len(), 16);
        assert!(m.temperature().iter().all(|&t| t == 20.0));
        assert!(m.eikonal().iter().all(|d| d.is_infinite()));
        assert!(m.speed().iter().all(|&s| s == 2.0));
    }

    #[test]
    fn tiny_mesh_is_widened() {
        assert_eq!(MeshState::new(0, 20.0, 1.0).n(), MIN_STENCIL_GRID);
        assert_eq!(MeshState::new(2, 20.0, 1.0).temperature().len(), 9);
    }

    #[test]
    fn swap_exchanges_buffers() {
        let mut m = MeshState::new(3, 20.0, 1.0);
        {
            let (_, scratch) = m.diffusion_buffers();
            scratch[4] = 99.0;
        }
        m.swap_temperature();
        assert_eq!(m.temperature_at(1, 1), Some(99.0));
        let (old, _) = m.diffusion_buffers();
        assert_eq!(old[4], 99.0);
    }

    #[test]
    fn rejects_bad_speeds_and_coordinates() {
        let mut m = MeshState::new(3, 20.0, 1.0);
        assert!(!m.set_speed(1, 1, 0.0));
        assert!(!m.set_speed(1, 1, f64::NAN));
        assert!(!m.set_speed(3, 0, 2.0));
        assert!(m.set_speed(2, 0, 2.0));
        assert_eq!(m.speed_at(2, 0), Some(2.0));
        assert_eq!(m.temperature_at(0, 3), None);
    }

    #[test]
    fn reinitialize_restores_ambient() {
        let mut m = MeshState::new(3, 20.0, 1.0);
        m.set_temperature(1, 1, 500.0);
        m.set_speed(0, 0, 9.0);
        m.eikonal_buffers().0[0] = 3.0;
        m.reinitialize(20.0, 1.0);
        assert!(m.temperature().iter().all(|&t| t == 20.0));
        assert!(m.eikonal().iter().all(|d| d.is_infinite()));
        assert_eq!(m.speed_at(0, 0), Some(1.0));
    }
}
