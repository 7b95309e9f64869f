//! Real-time 2D thermal field engine.
//!
//! Two models run on one square mesh: an explicit FTCS heat-diffusion
//! solver and a Dijkstra-based discrete Eikonal solver giving first-arrival
//! times from the heat sources. [`Simulation`] dispatches between them and
//! can blend both into a single temperature field.

pub mod config;
pub mod controller;
pub mod diffusion;
pub mod eikonal;
pub mod material;
pub mod mesh;
pub mod sources;

pub use config::SimConfig;
pub use controller::{Simulation, SimulationMode, StepReport, Stats};
pub use diffusion::{DiffusionReport, DiffusionSolver, STABILITY_LIMIT};
pub use eikonal::{EikonalReport, EikonalSolver};
pub use material::Material;
pub use mesh::MeshState;
pub use sources::{HeatSource, HeatSourceRegistry};
