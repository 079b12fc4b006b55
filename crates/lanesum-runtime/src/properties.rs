use std::collections::BTreeSet;

use crate::CubeDim;

/// Capabilities a device may expose to kernels.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Feature {
    /// Plane-level collectives (shuffles between units of the same plane).
    Plane,
}

/// Hardware limits relevant to launching kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProperties {
    /// The smallest plane size the device may use.
    pub plane_size_min: u32,
    /// The biggest plane size the device may use.
    pub plane_size_max: u32,
    /// Maximum number of units in a single cube.
    pub max_units_per_cube: u32,
    /// Maximum cube dim along each axis.
    pub max_cube_dim: CubeDim,
    /// Maximum number of cubes dispatched along each axis.
    pub max_cube_count: (u32, u32, u32),
}

/// Properties of what the device can do, like what [features](Feature) are
/// supported by it and what its hardware limits are.
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    set: BTreeSet<Feature>,
    /// The hardware limits of this device.
    pub hardware: HardwareProperties,
}

impl DeviceProperties {
    /// Create a new feature set with the given features and hardware properties.
    pub fn new(features: &[Feature], hardware: HardwareProperties) -> Self {
        let mut set = BTreeSet::new();
        for feature in features {
            set.insert(*feature);
        }

        DeviceProperties { set, hardware }
    }

    /// Check if the provided [feature](Feature) is supported by the runtime.
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        self.set.contains(&feature)
    }

    /// Register a [feature](Feature) supported by the device.
    ///
    /// This should only be used by a runtime when initializing a device.
    pub fn register_feature(&mut self, feature: Feature) -> bool {
        self.set.insert(feature)
    }

    /// The native plane width units are grouped in.
    ///
    /// CPU runtimes expose a fixed plane size, so `plane_size_min == plane_size_max`.
    pub fn plane_dim(&self) -> u32 {
        self.hardware.plane_size_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardware() -> HardwareProperties {
        HardwareProperties {
            plane_size_min: 32,
            plane_size_max: 32,
            max_units_per_cube: 1024,
            max_cube_dim: CubeDim::new_3d(1024, 1024, 64),
            max_cube_count: (u32::MAX, u16::MAX as u32, u16::MAX as u32),
        }
    }

    #[test]
    fn features_are_opt_in() {
        let mut props = DeviceProperties::new(&[], hardware());
        assert!(!props.feature_enabled(Feature::Plane));

        assert!(props.register_feature(Feature::Plane));
        assert!(!props.register_feature(Feature::Plane));
        assert!(props.feature_enabled(Feature::Plane));
        assert_eq!(props.plane_dim(), 32);
    }
}
