use tracing::debug;

use crate::mesh::MeshState;

/// A cell pinned to a fixed temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatSource {
    pub x: usize,
    pub y: usize,
    pub temperature: f64,
}

/// Heat sources in insertion order.
///
/// Duplicates at the same cell are kept; every consumer applies them in
/// order, so the most recent one wins.
#[derive(Debug, Clone, Default)]
pub struct HeatSourceRegistry {
    sources: Vec<HeatSource>,
}

impl HeatSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and stamp it into `mesh` right away.
    ///
    /// Coordinates outside the mesh are ignored; returns whether the source was added.
    pub fn add(&mut self, mesh: &mut MeshState, x: usize, y: usize, temperature: f64) -> bool {
        if !mesh.contains(x, y) {
            return false;
        }
        let source = HeatSource { x, y, temperature };
        mesh.stamp_source(&source);
        self.sources.push(source);
        debug!(x, y, temperature, "heat source added");
        true
    }

    /// Forget every source. The mesh is left untouched.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    pub fn all(&self) -> &[HeatSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Write every source temperature into `field` (an `n * n` row-major buffer).
    pub(crate) fn pin_temperatures(&self, field: &mut [f64], n: usize) {
        for s in &self.sources {
            field[s.y * n + s.x] = s.temperature;
        }
    }
}
