//! Explicit FTCS update of the temperature field.
//!
//! One step applies the 5-point Laplacian to interior cells, a cooling
//! copy rule to the boundary, re-pins every heat source and swaps the
//! double buffer.

use tracing::warn;

use crate::mesh::MeshState;
use crate::sources::HeatSourceRegistry;

/// Normalized grid spacing of the stencil.
pub const DX: f64 = 1.0;

/// Largest diffusion number for which 2D FTCS stays non-oscillatory.
pub const STABILITY_LIMIT: f64 = 0.25;

/// `r = α·Δt/Δx²`
pub fn diffusion_number(alpha: f64, dt: f64) -> f64 {
    alpha * dt / (DX * DX)
}

/// Outcome of one diffusion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionReport {
    pub diffusion_number: f64,
}

impl DiffusionReport {
    pub fn is_stable(&self) -> bool {
        self.diffusion_number <= STABILITY_LIMIT
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiffusionSolver {
    alpha: f64,
    cooling_rate: f64,
}

impl DiffusionSolver {
    pub fn new(alpha: f64, cooling_rate: f64) -> Self {
        Self {
            alpha,
            cooling_rate,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Advance the temperature field by `dt`.
    ///
    /// An unstable `dt` is reported and logged but still applied.
    pub fn step(
        &self,
        mesh: &mut MeshState,
        sources: &HeatSourceRegistry,
        dt: f64,
    ) -> DiffusionReport {
        let r = diffusion_number(self.alpha, dt);
        if r > STABILITY_LIMIT {
            warn!(r, dt, "time step may be too large for numerical stability");
        }

        let n = mesh.n();
        let keep = 1.0 - self.cooling_rate;
        let (cur, next) = mesh.diffusion_buffers();

        for y in 1..(n - 1) {
            let row = y * n;
            for x in 1..(n - 1) {
                let i = row + x;

                let u = cur[i];
                let up = cur[i - n];
                let down = cur[i + n];
                let left = cur[i - 1];
                let right = cur[i + 1];

                let lap = (up + down + left + right) - 4.0 * u;
                next[i] = u + r * lap;
            }
        }

        // Top, bottom, left, right per index. Corners are written twice and
        // keep the later write: left rule at (0,0) and (0,N-1), top rule at
        // (N-1,0), right rule at (N-1,N-1).
        let last = (n - 1) * n;
        for i in 0..n {
            let row = i * n;
            next[i] = cur[n + i] * keep;
            next[last + i] = cur[last - n + i] * keep;
            next[row] = cur[row + 1] * keep;
            next[row + n - 1] = cur[row + n - 2] * keep;
        }

        sources.pin_temperatures(next, n);
        mesh.swap_temperature();

        DiffusionReport { diffusion_number: r }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup(n: usize) -> (MeshState, HeatSourceRegistry) {
        (MeshState::new(n, 20.0, 1.0), HeatSourceRegistry::new())
    }

    #[test]
    fn neighbours_of_center_source() {
        let (mut mesh, mut reg) = setup(5);
        reg.add(&mut mesh, 2, 2, 800.0);
        // alpha 2.0, dt 0.1 -> r = 0.2
        let solver = DiffusionSolver::new(2.0, 0.005);
        let report = solver.step(&mut mesh, &reg, 0.1);

        assert_relative_eq!(report.diffusion_number, 0.2, epsilon = 1e-12);
        assert!(report.is_stable());
        // 20 + 0.2 * (20 + 20 + 20 + 800 - 4 * 20)
        for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert_relative_eq!(mesh.temperature_at(x, y).unwrap(), 176.0, epsilon = 1e-9);
        }
        assert_eq!(mesh.temperature_at(2, 2), Some(800.0));
        // diagonal neighbours only see ambient cells
        assert_relative_eq!(mesh.temperature_at(1, 1).unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_cools_interior_neighbour() {
        let (mut mesh, reg) = setup(4);
        mesh.set_temperature(1, 1, 100.0);
        let solver = DiffusionSolver::new(0.0, 0.5);
        solver.step(&mut mesh, &reg, 0.01);

        // top row copies row 1
        assert_eq!(mesh.temperature_at(1, 0), Some(50.0));
        // left column copies column 1
        assert_eq!(mesh.temperature_at(0, 1), Some(50.0));
        assert_eq!(mesh.temperature_at(2, 0), Some(10.0));
    }

    #[test]
    fn corners_keep_the_later_boundary_write() {
        let (mut mesh, reg) = setup(4);
        // each corner has two candidate source cells
        for (x, y, t) in [
            (0, 1, 101.0),
            (1, 0, 102.0),
            (2, 0, 201.0),
            (3, 1, 202.0),
            (0, 2, 301.0),
            (1, 3, 302.0),
            (3, 2, 401.0),
            (2, 3, 402.0),
        ] {
            mesh.set_temperature(x, y, t);
        }
        let solver = DiffusionSolver::new(0.0, 0.0);
        solver.step(&mut mesh, &reg, 0.01);

        assert_eq!(mesh.temperature_at(0, 0), Some(102.0));
        assert_eq!(mesh.temperature_at(3, 0), Some(202.0));
        assert_eq!(mesh.temperature_at(0, 3), Some(302.0));
        assert_eq!(mesh.temperature_at(3, 3), Some(402.0));
    }

    #[test]
    fn degenerate_mesh_is_widened_for_the_stencil() {
        let mut mesh = MeshState::new(1, 20.0, 1.0);
        assert_eq!(mesh.n(), 3);
        let mut reg = HeatSourceRegistry::new();
        reg.add(&mut mesh, 1, 1, 800.0);
        DiffusionSolver::new(2.0, 0.005).step(&mut mesh, &reg, 0.1);
        assert_eq!(mesh.temperature_at(1, 1), Some(800.0));
    }

    #[test]
    fn unstable_step_still_runs() {
        let (mut mesh, mut reg) = setup(5);
        reg.add(&mut mesh, 2, 2, 800.0);
        let solver = DiffusionSolver::new(1.0, 0.005);
        let report = solver.step(&mut mesh, &reg, 1.0);
        assert!(!report.is_stable());
        assert!(mesh.temperature_at(1, 2).unwrap() > 20.0);
    }

    #[test]
    fn uniform_interior_is_steady() {
        let (mut mesh, reg) = setup(6);
        let solver = DiffusionSolver::new(2.0, 0.005);
        solver.step(&mut mesh, &reg, 0.1);
        for y in 1..5 {
            for x in 1..5 {
                assert_relative_eq!(mesh.temperature_at(x, y).unwrap(), 20.0, epsilon = 1e-12);
            }
        }
    }
}
