use crate::{
    BackTrace, CubeCount, CubeDim, DeviceProperties,
    server::{LaunchError, ResourceLimitError},
};

/// Validate the cube dim of a kernel fits within the hardware limits
pub fn validate_cube_dim(
    properties: &DeviceProperties,
    cube_dim: CubeDim,
) -> Result<(), LaunchError> {
    let max = properties.hardware.max_cube_dim;
    if !max.can_contain(cube_dim) {
        Err(ResourceLimitError::CubeDim {
            requested: cube_dim.as_tuple(),
            max: max.as_tuple(),
            backtrace: BackTrace::capture(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Validate the total units of a kernel fits within `max`, returning that total.
///
/// A total that overflows a `u32` is reported as `u32::MAX` units.
pub fn validate_units(cube_dim: CubeDim, max: u32) -> Result<u32, LaunchError> {
    match cube_dim.checked_num_elems() {
        Some(requested) if requested <= max => Ok(requested),
        requested => Err(ResourceLimitError::Units {
            requested: requested.unwrap_or(u32::MAX),
            max,
            backtrace: BackTrace::capture(),
        }
        .into()),
    }
}

/// Validate the cube count of a kernel fits within `max` along every axis, returning the
/// total number of cubes.
pub fn validate_cube_count(
    cube_count: CubeCount,
    max: (u32, u32, u32),
) -> Result<u32, LaunchError> {
    let requested = cube_count.as_tuple();
    let fits = requested.0 <= max.0 && requested.1 <= max.1 && requested.2 <= max.2;

    match cube_count.checked_num_cubes() {
        Some(num_cubes) if fits => Ok(num_cubes),
        _ => Err(ResourceLimitError::CubeCount {
            requested,
            max,
            backtrace: BackTrace::capture(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Feature, HardwareProperties};

    fn properties() -> DeviceProperties {
        let hardware = HardwareProperties {
            plane_size_min: 32,
            plane_size_max: 32,
            max_units_per_cube: 1024,
            max_cube_dim: CubeDim::new_3d(1024, 1024, 64),
            max_cube_count: (u32::MAX, u16::MAX as u32, u16::MAX as u32),
        };
        DeviceProperties::new(&[Feature::Plane], hardware)
    }

    #[test]
    fn cube_dim_is_checked_per_axis() {
        let properties = properties();
        assert!(validate_cube_dim(&properties, CubeDim::new_3d(1024, 1, 64)).is_ok());

        match validate_cube_dim(&properties, CubeDim::new_3d(1, 1, 65)) {
            Err(LaunchError::TooManyResources(ResourceLimitError::CubeDim {
                requested, max, ..
            })) => {
                assert_eq!(requested, (1, 1, 65));
                assert_eq!(max, (1024, 1024, 64));
            }
            other => panic!("Expected a cube dim error, got {other:?}"),
        }
    }

    #[test]
    fn units_are_counted_without_overflow() {
        assert_eq!(validate_units(CubeDim::new_2d(32, 32), 1024).unwrap(), 1024);

        match validate_units(CubeDim::new_3d(65536, 65536, 1), 1024) {
            Err(LaunchError::TooManyResources(ResourceLimitError::Units {
                requested, max, ..
            })) => {
                assert_eq!(requested, u32::MAX);
                assert_eq!(max, 1024);
            }
            other => panic!("Expected a unit count error, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_unit_count_never_fits() {
        let result = validate_units(CubeDim::new_3d(65536, 65536, 1), u32::MAX);
        assert!(
            matches!(
                result,
                Err(LaunchError::TooManyResources(ResourceLimitError::Units { .. }))
            ),
            "{result:?}"
        );
    }

    #[test]
    fn cube_count_is_checked_per_axis_and_in_total() {
        let max = properties().hardware.max_cube_count;
        assert_eq!(validate_cube_count(CubeCount::new_3d(4, 2, 1), max).unwrap(), 8);

        for cube_count in [
            CubeCount::new_3d(1, 65536, 1),
            CubeCount::new_3d(u32::MAX, 2, 1),
        ] {
            let result = validate_cube_count(cube_count, max);
            assert!(
                matches!(
                    result,
                    Err(LaunchError::TooManyResources(ResourceLimitError::CubeCount { .. }))
                ),
                "{result:?}"
            );
        }
    }
}
