/// Physical constants of the single material filling the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub name: &'static str,
    /// W/m·K
    pub thermal_conductivity: f64,
    /// kg/m³
    pub density: f64,
    /// J/kg·K
    pub specific_heat: f64,
    /// m²/s, the `α` of the diffusion stencil
    pub thermal_diffusivity: f64,
    /// °C
    pub melting_point: f64,
}

impl Material {
    pub const IRON: Material = Material {
        name: "iron",
        thermal_conductivity: 80.4,
        density: 7874.0,
        specific_heat: 449.0,
        thermal_diffusivity: 2.3e-5,
        melting_point: 1538.0,
    };

    /// A material described only by its diffusivity, for experiments and tests.
    pub fn with_diffusivity(name: &'static str, alpha: f64) -> Self {
        Self {
            name,
            thermal_diffusivity: alpha,
            ..Self::IRON
        }
    }

    pub fn diffusivity(&self) -> f64 {
        self.thermal_diffusivity
    }

    /// Front speed used to seed the propagation-speed field.
    pub fn propagation_speed(&self, scale: f64) -> f64 {
        self.thermal_diffusivity.sqrt() * scale
    }

    pub fn is_molten(&self, temperature: f64) -> bool {
        temperature >= self.melting_point
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::IRON
    }
}
