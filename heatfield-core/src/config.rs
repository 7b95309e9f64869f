//! Simulation configuration and its bounds.

/// Smallest mesh that still has one interior cell for the 5-point stencil.
pub const MIN_STENCIL_GRID: usize = 3;

/// Factor applied by [`crate::Simulation::increase_time_step`].
pub const TIME_STEP_GROWTH: f64 = 1.1;

/// Factor applied by [`crate::Simulation::decrease_time_step`].
pub const TIME_STEP_SHRINK: f64 = 0.9;

/// Immutable settings a [`crate::Simulation`] is built from.
///
/// `Default` reproduces the reference iron-mesh setup. Values are sanitized
/// once at construction, so a hand-built config with swapped or non-finite
/// bounds degrades to the defaults instead of panicking in `clamp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Requested side length `N` of the square mesh
    pub grid_size: usize,
    pub min_grid_size: usize,
    pub max_grid_size: usize,
    /// Temperature every cell starts at (°C)
    pub ambient_temp: f64,
    /// Peak of the radiant blend and display curves (°C)
    pub max_display_temp: f64,
    /// Fraction of heat a boundary cell loses relative to its interior neighbour
    pub cooling_rate: f64,
    /// Temperature of the source placed at the mesh centre on construction and reset
    pub default_source_temp: f64,
    pub time_step: f64,
    pub min_time_step: f64,
    pub max_time_step: f64,
    /// Weight `w` of the radiant temperature in combined mode
    pub blend_weight: f64,
    /// Decay constant of the radiant temperature in combined mode
    pub blend_decay: f64,
    /// Decay constant used when presenting the Eikonal field as a temperature
    pub display_decay: f64,
    /// Multiplier turning `sqrt(α)` into a propagation speed
    pub speed_scale: f64,
    /// Iterations between status log lines (0 disables them)
    pub status_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            min_grid_size: 20,
            max_grid_size: 200,
            ambient_temp: 20.0,
            max_display_temp: 1000.0,
            cooling_rate: 0.005,
            default_source_temp: 800.0,
            time_step: 0.01,
            min_time_step: 0.001,
            max_time_step: 0.1,
            blend_weight: 0.15,
            blend_decay: 0.08,
            display_decay: 0.1,
            speed_scale: 1000.0,
            status_interval: 100,
        }
    }
}

impl SimConfig {
    pub fn with_grid_size(mut self, n: usize) -> Self {
        self.grid_size = n;
        self
    }

    pub fn with_grid_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_grid_size = min;
        self.max_grid_size = max;
        self
    }

    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.time_step = dt;
        self
    }

    pub fn with_time_step_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_time_step = min;
        self.max_time_step = max;
        self
    }

    pub fn with_ambient_temp(mut self, t: f64) -> Self {
        self.ambient_temp = t;
        self
    }

    pub fn with_default_source_temp(mut self, t: f64) -> Self {
        self.default_source_temp = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_speed_scale(mut self, scale: f64) -> Self {
        self.speed_scale = scale;
        self
    }

    pub fn with_status_interval(mut self, every: u64) -> Self {
        self.status_interval = every;
        self
    }

    /// Grid side after applying the configured bounds.
    pub fn clamped_grid_size(&self) -> usize {
        let lo = self.min_grid_size.max(MIN_STENCIL_GRID);
        let hi = self.max_grid_size.max(lo);
        self.grid_size.clamp(lo, hi)
    }

    /// Clamp a requested time step into `[min_time_step, max_time_step]`.
    /// NaN maps to the lower bound; swapped bounds are read in order.
    pub fn clamp_time_step(&self, dt: f64) -> f64 {
        let lo = self.min_time_step.min(self.max_time_step);
        let hi = self.min_time_step.max(self.max_time_step);
        if dt.is_nan() {
            return lo;
        }
        dt.max(lo).min(hi)
    }

    /// Replace unusable values with defaults and order the bounds.
    pub(crate) fn sanitized(self) -> Self {
        let d = Self::default();
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let positive_or = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };

        let mut min_dt = positive_or(self.min_time_step, d.min_time_step);
        let mut max_dt = positive_or(self.max_time_step, d.max_time_step);
        if min_dt > max_dt {
            std::mem::swap(&mut min_dt, &mut max_dt);
        }

        let mut out = Self {
            grid_size: self.grid_size,
            min_grid_size: self.min_grid_size.max(MIN_STENCIL_GRID),
            max_grid_size: self.max_grid_size.max(self.min_grid_size.max(MIN_STENCIL_GRID)),
            ambient_temp: finite_or(self.ambient_temp, d.ambient_temp),
            max_display_temp: finite_or(self.max_display_temp, d.max_display_temp),
            cooling_rate: finite_or(self.cooling_rate, d.cooling_rate).clamp(0.0, 1.0),
            default_source_temp: finite_or(self.default_source_temp, d.default_source_temp),
            time_step: self.time_step,
            min_time_step: min_dt,
            max_time_step: max_dt,
            blend_weight: finite_or(self.blend_weight, d.blend_weight).clamp(0.0, 1.0),
            blend_decay: positive_or(self.blend_decay, d.blend_decay),
            display_decay: positive_or(self.display_decay, d.display_decay),
            speed_scale: positive_or(self.speed_scale, d.speed_scale),
            status_interval: self.status_interval,
        };
        out.grid_size = out.clamped_grid_size();
        out.time_step = out.clamp_time_step(self.time_step);
        out
    }
}
