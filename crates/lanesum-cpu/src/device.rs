use lanesum_runtime::{
    client::ComputeClient,
    config::{GlobalConfig, Logger},
    CubeDim, DeviceProperties, Feature, HardwareProperties,
};

/// Deepest a cube may be along `z`.
const MAX_CUBE_DIM_Z: u32 = 64;
/// Cubes run one after the other, so only the `y` and `z` axes are bounded.
const MAX_CUBE_COUNT: (u32, u32, u32) = (u32::MAX, u16::MAX as u32, u16::MAX as u32);

/// Create a client for a CPU device shaped by the global configuration.
pub(crate) fn create_client(runtime: &str) -> ComputeClient {
    let config = GlobalConfig::get();
    let plane_dim = config.device.plane_dim_checked();
    let max_units_per_cube = config.device.max_units_per_cube;

    // The plane size is fixed on the CPU.
    let hardware = HardwareProperties {
        plane_size_min: plane_dim,
        plane_size_max: plane_dim,
        max_units_per_cube,
        max_cube_dim: CubeDim::new_3d(max_units_per_cube, max_units_per_cube, MAX_CUBE_DIM_Z),
        max_cube_count: MAX_CUBE_COUNT,
    };
    let properties = DeviceProperties::new(&[Feature::Plane], hardware);

    log::info!("Creating the {runtime} client with a plane dim of {plane_dim}");

    ComputeClient::new(properties, Logger::from_config(config))
}
