use heatfield_core::{Material, SimConfig, Simulation, SimulationMode};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct Simulator {
    inner: Simulation,
    display: Vec<f64>,
}

#[wasm_bindgen]
impl Simulator {
    /// Iron mesh of side `n` (clamped to the supported range).
    #[wasm_bindgen(constructor)]
    pub fn new(n: usize) -> Simulator {
        let inner = Simulation::new(SimConfig::default().with_grid_size(n), Material::IRON);
        Simulator {
            inner,
            display: Vec::new(),
        }
    }

    // Controls
    /// Grid coordinates; negative or off-grid values are ignored.
    pub fn add_heat_source(&mut self, x: i32, y: i32, temperature: f64) -> bool {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) => self.inner.add_heat_source(x, y, temperature),
            _ => false,
        }
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: SimulationMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.set_mode(mode);
        Ok(())
    }
    pub fn mode(&self) -> String { self.inner.mode().to_string() }

    pub fn set_time_step(&mut self, dt: f64) { self.inner.set_time_step(dt); }
    pub fn increase_time_step(&mut self) { self.inner.increase_time_step(); }
    pub fn decrease_time_step(&mut self) { self.inner.decrease_time_step(); }
    pub fn time_step(&self) -> f64 { self.inner.time_step() }

    pub fn toggle_running(&mut self) -> bool { self.inner.toggle_running() }
    pub fn is_running(&self) -> bool { self.inner.is_running() }
    pub fn reset(&mut self) { self.inner.reset(); }

    pub fn n(&self) -> usize { self.inner.grid_size() }

    // Copy-based JS access (reliable)
    pub fn get_temperature(&self) -> Vec<f64> {
        self.inner.temperature_field().to_vec()
    }
    pub fn get_eikonal(&self) -> Vec<f64> {
        self.inner.eikonal_field().to_vec()
    }
    /// Scalar field for the current mode, ready for color mapping.
    pub fn get_display(&mut self) -> Vec<f64> {
        self.inner.display_field(&mut self.display);
        self.display.clone()
    }

    pub fn stats(&self) -> Stats {
        let s = self.inner.stats();
        Stats {
            elapsed_time: s.elapsed_time,
            iterations: s.iterations as f64,
            max_temperature: s.max_temperature,
        }
    }

    // Step + timing (WASM-only)
    pub fn step(&mut self) -> StepInfo {
        let t0 = now_ms();
        let report = self.inner.step();
        let t1 = now_ms();
        StepInfo {
            ran: report.is_some(),
            compute_ms: t1 - t0,
            diffusion_number: report.and_then(|r| r.diffusion_number).unwrap_or(0.0),
            unstable: report.is_some_and(|r| r.stability_warning()),
        }
    }
}

#[wasm_bindgen]
pub struct StepInfo {
    ran: bool,
    compute_ms: f64,
    diffusion_number: f64,
    unstable: bool,
}

#[wasm_bindgen]
impl StepInfo {
    pub fn ran(&self) -> bool { self.ran }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
    pub fn diffusion_number(&self) -> f64 { self.diffusion_number }
    pub fn unstable(&self) -> bool { self.unstable }
}

#[wasm_bindgen]
pub struct Stats {
    elapsed_time: f64,
    iterations: f64,
    max_temperature: f64,
}

#[wasm_bindgen]
impl Stats {
    pub fn elapsed_time(&self) -> f64 { self.elapsed_time }
    pub fn iterations(&self) -> f64 { self.iterations }
    pub fn max_temperature(&self) -> f64 { self.max_temperature }
}


fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
