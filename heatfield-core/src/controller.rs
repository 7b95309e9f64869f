//! Mode state machine tying the mesh, the source registry and both solvers together.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::{SimConfig, TIME_STEP_GROWTH, TIME_STEP_SHRINK};
use crate::diffusion::{self, DiffusionSolver, STABILITY_LIMIT};
use crate::eikonal::EikonalSolver;
use crate::material::Material;
use crate::mesh::MeshState;
use crate::sources::{HeatSource, HeatSourceRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimulationMode {
    #[default]
    Diffusion,
    Eikonal,
    Combined,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 3] = [
        SimulationMode::Diffusion,
        SimulationMode::Eikonal,
        SimulationMode::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationMode::Diffusion => "diffusion",
            SimulationMode::Eikonal => "eikonal",
            SimulationMode::Combined => "combined",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diffusion" | "heat" | "1" => Ok(SimulationMode::Diffusion),
            "eikonal" | "2" => Ok(SimulationMode::Eikonal),
            "combined" | "3" => Ok(SimulationMode::Combined),
            other => Err(format!(
                "unknown mode {other:?} (expected diffusion, eikonal or combined)"
            )),
        }
    }
}

/// What a non-skipped [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub mode: SimulationMode,
    /// Diffusion number of the step, when the diffusion solver ran
    pub diffusion_number: Option<f64>,
    /// Cells with a finite arrival time, when the Eikonal solver ran
    pub eikonal_reached: Option<usize>,
}

impl StepReport {
    /// True when the diffusion pass exceeded the FTCS stability bound.
    pub fn stability_warning(&self) -> bool {
        self.diffusion_number.is_some_and(|r| r > STABILITY_LIMIT)
    }
}

/// Status line values for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub elapsed_time: f64,
    pub iterations: u64,
    /// Hottest cell, never reported below ambient
    pub max_temperature: f64,
    pub molten_cells: usize,
    pub source_count: usize,
}

/// The simulation engine.
///
/// Starts paused with the whole mesh at ambient and one default source at
/// the centre. Nothing here fails: bad inputs are clamped or ignored.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    material: Material,
    mesh: MeshState,
    sources: HeatSourceRegistry,
    diffusion: DiffusionSolver,
    eikonal: EikonalSolver,
    mode: SimulationMode,
    time_step: f64,
    elapsed_time: f64,
    iterations: u64,
    running: bool,
}

impl Simulation {
    pub fn new(config: SimConfig, material: Material) -> Self {
        let config = config.sanitized();
        let n = config.grid_size;
        let speed = material.propagation_speed(config.speed_scale);

        info!(
            n,
            material = material.name,
            conductivity = material.thermal_conductivity,
            diffusivity = material.thermal_diffusivity,
            density = material.density,
            melting_point = material.melting_point,
            "creating heat field simulation"
        );

        let mut sim = Self {
            config,
            material,
            mesh: MeshState::new(n, config.ambient_temp, speed),
            sources: HeatSourceRegistry::new(),
            diffusion: DiffusionSolver::new(material.diffusivity(), config.cooling_rate),
            eikonal: EikonalSolver::new(n),
            mode: SimulationMode::default(),
            time_step: config.time_step,
            elapsed_time: 0.0,
            iterations: 0,
            running: false,
        };
        sim.add_default_source();
        sim
    }

    fn add_default_source(&mut self) {
        let c = self.mesh.n() / 2;
        self.sources
            .add(&mut self.mesh, c, c, self.config.default_source_temp);
    }

    // ---- Inputs from the presentation layer ----

    /// Pin `(x, y)` to `temperature`. Off-grid coordinates are ignored.
    pub fn add_heat_source(&mut self, x: usize, y: usize, temperature: f64) -> bool {
        self.sources.add(&mut self.mesh, x, y, temperature)
    }

    /// Takes effect on the next [`step`](Self::step); fields are not touched.
    pub fn set_mode(&mut self, mode: SimulationMode) {
        if mode != self.mode {
            debug!(%mode, "mode changed");
        }
        self.mode = mode;
    }

    pub fn set_time_step(&mut self, dt: f64) {
        self.time_step = self.config.clamp_time_step(dt);
        debug!(time_step = self.time_step, "time step set");
    }

    pub fn increase_time_step(&mut self) {
        self.set_time_step(self.time_step * TIME_STEP_GROWTH);
    }

    pub fn decrease_time_step(&mut self) {
        self.set_time_step(self.time_step * TIME_STEP_SHRINK);
    }

    /// Flip between running and paused; returns the new state.
    pub fn toggle_running(&mut self) -> bool {
        self.set_running(!self.running);
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        debug!(running, "run state changed");
    }

    /// Override one cell of the propagation-speed field until the next reset.
    pub fn set_propagation_speed(&mut self, x: usize, y: usize, speed: f64) -> bool {
        self.mesh.set_speed(x, y, speed)
    }

    /// Back to the construction state, paused. Mode and time step are kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_time = 0.0;
        self.iterations = 0;
        self.sources.clear();
        self.mesh.reinitialize(
            self.config.ambient_temp,
            self.material.propagation_speed(self.config.speed_scale),
        );
        self.add_default_source();
        debug!("simulation reset");
    }

    /// Advance one tick in the current mode. Returns `None` while paused.
    pub fn step(&mut self) -> Option<StepReport> {
        if !self.running {
            return None;
        }

        let mode = self.mode;
        let report = match mode {
            SimulationMode::Diffusion => {
                let d = self.run_diffusion();
                StepReport {
                    mode,
                    diffusion_number: Some(d),
                    eikonal_reached: None,
                }
            }
            SimulationMode::Eikonal => {
                let reached = self.eikonal.solve(&mut self.mesh, &self.sources).reached;
                StepReport {
                    mode,
                    diffusion_number: None,
                    eikonal_reached: Some(reached),
                }
            }
            SimulationMode::Combined => {
                let reached = self.eikonal.solve(&mut self.mesh, &self.sources).reached;
                let d = self.run_diffusion();
                self.blend_radiant();
                StepReport {
                    mode,
                    diffusion_number: Some(d),
                    eikonal_reached: Some(reached),
                }
            }
        };

        self.elapsed_time += self.time_step;
        self.iterations += 1;

        let every = self.config.status_interval;
        if every > 0 && self.iterations % every == 0 {
            info!(
                time = self.elapsed_time,
                max_temp = self.mesh.max_temperature(self.config.ambient_temp),
                iterations = self.iterations,
                "status"
            );
        }

        Some(report)
    }

    fn run_diffusion(&mut self) -> f64 {
        self.diffusion
            .step(&mut self.mesh, &self.sources, self.time_step)
            .diffusion_number
    }

    /// Pull every reached cell toward the radiant temperature of its arrival
    /// time, then pin the sources again.
    fn blend_radiant(&mut self) {
        let SimConfig {
            ambient_temp,
            max_display_temp,
            blend_weight: w,
            blend_decay,
            ..
        } = self.config;
        let n = self.mesh.n();
        let (temp, dist) = self.mesh.blend_buffers();

        for (t, &d) in temp.iter_mut().zip(dist) {
            if d.is_finite() {
                let radiant = ambient_temp.max(max_display_temp * (-d * blend_decay).exp());
                *t = (1.0 - w) * *t + w * radiant;
            }
        }
        self.sources.pin_temperatures(temp, n);
    }

    // ---- Read accessors ----

    pub fn temperature_field(&self) -> &[f64] {
        self.mesh.temperature()
    }

    pub fn eikonal_field(&self) -> &[f64] {
        self.mesh.eikonal()
    }

    pub fn speed_field(&self) -> &[f64] {
        self.mesh.speed()
    }

    pub fn mesh(&self) -> &MeshState {
        &self.mesh
    }

    pub fn sources(&self) -> &[HeatSource] {
        self.sources.all()
    }

    /// Fill `out` with the scalar the current mode is displayed with.
    ///
    /// Eikonal mode maps arrival time to a temperature-like value; the other
    /// modes show the temperature field unchanged.
    pub fn display_field(&self, out: &mut Vec<f64>) {
        out.clear();
        match self.mode {
            SimulationMode::Eikonal => {
                let ambient = self.config.ambient_temp;
                let peak = self.config.max_display_temp;
                let k = self.config.display_decay;
                out.extend(self.mesh.eikonal().iter().map(|&d| {
                    if d.is_finite() {
                        ambient.max(peak * (-d * k).exp())
                    } else {
                        ambient
                    }
                }));
            }
            SimulationMode::Diffusion | SimulationMode::Combined => {
                out.extend_from_slice(self.mesh.temperature());
            }
        }
    }

    pub fn stats(&self) -> Stats {
        let temps = self.mesh.temperature();
        Stats {
            elapsed_time: self.elapsed_time,
            iterations: self.iterations,
            max_temperature: self.mesh.max_temperature(self.config.ambient_temp),
            molten_cells: temps.iter().filter(|&&t| self.material.is_molten(t)).count(),
            source_count: self.sources.len(),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.mesh.n()
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Diffusion number the next diffusion step would use.
    pub fn diffusion_number(&self) -> f64 {
        diffusion::diffusion_number(self.diffusion.alpha(), self.time_step)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default(), Material::IRON)
    }
}
