use core::fmt::Debug;

/// The number of units in a cube along each axis.
#[derive(Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CubeDim {
    /// Units along the x axis.
    pub x: u32,
    /// Units along the y axis.
    pub y: u32,
    /// Units along the z axis.
    pub z: u32,
}

impl CubeDim {
    /// Create a new cube dim with x = y = z = 1.
    pub const fn new_single() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }

    /// Create a new cube dim with the given x, and y = z = 1.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Create a new cube dim with the given x and y, and z = 1.
    pub const fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y, z: 1 }
    }

    /// Create a new cube dim with the given x, y and z.
    pub const fn new_3d(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of units in the cube.
    ///
    /// # Panics
    ///
    /// If the total overflows a `u32`. Use [`CubeDim::checked_num_elems`] on dims that weren't
    /// validated.
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// Total number of units in the cube, or `None` if it overflows a `u32`.
    pub const fn checked_num_elems(&self) -> Option<u32> {
        match self.x.checked_mul(self.y) {
            Some(xy) => xy.checked_mul(self.z),
            None => None,
        }
    }

    /// Whether this cube dim is at least as big as `other` along every axis.
    pub const fn can_contain(&self, other: CubeDim) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }

    /// The units along each axis.
    pub const fn as_tuple(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }
}

impl Default for CubeDim {
    fn default() -> Self {
        Self::new_1d(32)
    }
}

impl Debug for CubeDim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("({}, {}, {})", self.x, self.y, self.z))
    }
}

/// Specifies the number of cubes to be dispatched for a kernel.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CubeCount {
    /// Dispatch a known count of x, y, z cubes.
    Static(u32, u32, u32),
}

impl CubeCount {
    /// Create a new static cube count with x = y = z = 1.
    pub fn new_single() -> Self {
        CubeCount::Static(1, 1, 1)
    }

    /// Create a new static cube count with the given x, and y = z = 1.
    pub fn new_1d(x: u32) -> Self {
        CubeCount::Static(x, 1, 1)
    }

    /// Create a new static cube count with the given x, y and z.
    pub fn new_3d(x: u32, y: u32, z: u32) -> Self {
        CubeCount::Static(x, y, z)
    }

    /// Total number of cubes dispatched, or `None` if it overflows a `u32`.
    pub fn checked_num_cubes(&self) -> Option<u32> {
        match self {
            CubeCount::Static(x, y, z) => x.checked_mul(*y)?.checked_mul(*z),
        }
    }

    /// The count along each axis.
    pub fn as_tuple(&self) -> (u32, u32, u32) {
        match self {
            CubeCount::Static(x, y, z) => (*x, *y, *z),
        }
    }
}

impl Debug for CubeCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CubeCount::Static(x, y, z) => f.write_fmt(format_args!("({x}, {y}, {z})")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_dim_counts_every_axis() {
        assert_eq!(CubeDim::new_3d(4, 2, 3).num_elems(), 24);
        assert_eq!(CubeDim::new_1d(32).num_elems(), 32);
        assert_eq!(format!("{:?}", CubeDim::new_2d(8, 2)), "(8, 2, 1)");
    }

    #[test]
    fn oversized_cube_dims_have_no_unit_count() {
        assert_eq!(CubeDim::new_3d(4, 2, 3).checked_num_elems(), Some(24));
        assert_eq!(CubeDim::new_3d(65536, 65536, 1).checked_num_elems(), None);
        assert_eq!(CubeDim::new_3d(1, 65536, 65536).checked_num_elems(), None);
    }

    #[test]
    fn cube_dim_contains_smaller_dims() {
        let max = CubeDim::new_3d(1024, 1024, 64);

        assert!(max.can_contain(CubeDim::new_3d(1024, 1, 64)));
        assert!(!max.can_contain(CubeDim::new_3d(1, 1, 65)));
        assert!(!max.can_contain(CubeDim::new_1d(1025)));
    }

    #[test]
    fn cube_count_single_is_one_cube() {
        assert_eq!(CubeCount::new_single().checked_num_cubes(), Some(1));
        assert_eq!(CubeCount::new_3d(2, 2, 1).as_tuple(), (2, 2, 1));
        assert_eq!(CubeCount::new_3d(u32::MAX, 2, 1).checked_num_cubes(), None);
    }
}
