/// Default plane width of the CPU runtimes, matching a CUDA warp.
pub const DEFAULT_PLANE_DIM: u32 = 32;

/// Default limit of units in a single cube.
pub const DEFAULT_MAX_UNITS_PER_CUBE: u32 = 1024;

/// Configuration of the simulated device.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Number of units executing in lock-step in a plane.
    #[serde(default = "plane_dim_default")]
    pub plane_dim: u32,

    /// Maximum number of units a single cube may contain.
    #[serde(default = "max_units_per_cube_default")]
    pub max_units_per_cube: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            plane_dim: DEFAULT_PLANE_DIM,
            max_units_per_cube: DEFAULT_MAX_UNITS_PER_CUBE,
        }
    }
}

impl DeviceConfig {
    /// The plane dim to expose, falling back to the default when the configured value isn't a
    /// power of two. XOR shuffles only stay inside a plane for power-of-two widths.
    pub fn plane_dim_checked(&self) -> u32 {
        if self.plane_dim.is_power_of_two() {
            self.plane_dim
        } else {
            log::warn!(
                "Plane dim {} isn't a power of two, using {DEFAULT_PLANE_DIM} instead",
                self.plane_dim
            );
            DEFAULT_PLANE_DIM
        }
    }
}

fn plane_dim_default() -> u32 {
    DEFAULT_PLANE_DIM
}

fn max_units_per_cube_default() -> u32 {
    DEFAULT_MAX_UNITS_PER_CUBE
}
