//! Lock-step plane model.
//!
//! A kernel is written once for the whole cube: every value it manipulates is a [`Lanes`]
//! register holding one entry per unit, and every instruction applies to all units at once.
//! Data only moves between units through a [`PlaneCollective`], which each runtime
//! implements with whatever its hardware offers.

use core::ops::AddAssign;
use lanesum_runtime::CubeDim;

use crate::Float;

/// A register holding one value per unit of a cube, indexed by `UNIT_POS`.
#[derive(Clone, Debug, PartialEq)]
pub struct Lanes<T> {
    values: Vec<T>,
}

impl<T: Copy> Lanes<T> {
    /// Create a register where unit `unit_pos` holds `func(unit_pos)`.
    pub fn from_fn(num_units: u32, func: impl FnMut(u32) -> T) -> Self {
        Self {
            values: (0..num_units).map(func).collect(),
        }
    }

    /// Number of units holding a value.
    pub fn num_units(&self) -> u32 {
        self.values.len() as u32
    }

    /// The value held by a unit, if the unit exists.
    pub fn unit(&self, unit_pos: u32) -> Option<T> {
        self.values.get(unit_pos as usize).copied()
    }

    /// Apply `func` on every unit.
    pub fn map<U: Copy>(&self, func: impl FnMut(T) -> U) -> Lanes<U> {
        Lanes {
            values: self.values.iter().copied().map(func).collect(),
        }
    }

    /// Iterate over the values in `UNIT_POS` order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().copied()
    }

    /// The values in `UNIT_POS` order.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Grow the register with `fill` or drop its last units, so it holds `num_units` values.
    pub fn resize(&mut self, num_units: u32, fill: T) {
        self.values.resize(num_units as usize, fill);
    }
}

impl<T> From<Vec<T>> for Lanes<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<F: Float> AddAssign for Lanes<F> {
    fn add_assign(&mut self, rhs: Self) {
        debug_assert_eq!(self.values.len(), rhs.values.len());

        for (lhs, rhs) in self.values.iter_mut().zip(rhs.values) {
            *lhs += rhs;
        }
    }
}

/// Exchange of registers between the units of a plane.
///
/// Collectives are synchronous: every unit takes part, and every unit observes the values its
/// partners held before the exchange.
pub trait PlaneCollective: Default + Send + Sync + core::fmt::Debug + 'static {
    /// Every unit receives the value held by unit `unit_pos ^ mask`.
    ///
    /// A partner outside the launched units is an idle lane and reads as zero.
    fn shuffle_xor<F: Float>(&self, values: &Lanes<F>, mask: u32) -> Lanes<F>;
}

/// Builtins and collectives available to a kernel running on a single cube.
#[derive(new, Debug)]
pub struct PlaneContext<'a, C: PlaneCollective> {
    collective: &'a C,
    cube_dim: CubeDim,
    plane_dim: u32,
}

impl<C: PlaneCollective> PlaneContext<'_, C> {
    /// `CUBE_DIM`: number of units in the cube.
    pub fn cube_dim(&self) -> u32 {
        self.cube_dim.num_elems()
    }

    /// `PLANE_DIM`: native number of units executing in lock-step.
    pub fn plane_dim(&self) -> u32 {
        self.plane_dim
    }

    /// Plane dim clamped to the units actually launched.
    ///
    /// Smaller cubes leave the upper lanes of the plane idle, so collectives never need to
    /// reach past the cube.
    pub fn plane_dim_checked(&self) -> u32 {
        Ord::min(self.plane_dim, self.cube_dim())
    }

    /// `UNIT_POS`: the position of each unit in the cube.
    pub fn unit_pos(&self) -> Lanes<u32> {
        Lanes::from_fn(self.cube_dim(), |unit_pos| unit_pos)
    }

    /// Every unit receives the value of unit `UNIT_POS ^ mask` of the same plane.
    pub fn plane_shuffle_xor<F: Float>(&self, value: &Lanes<F>, mask: u32) -> Lanes<F> {
        debug_assert!(mask < self.plane_dim, "Shuffle would cross planes");
        self.collective.shuffle_xor(value, mask)
    }
}

/// Butterfly sum over each plane: after `log2(plane_dim)` shuffle steps every unit holds the
/// sum of the values in its plane.
///
/// Idle lanes of a partial plane hold zero and take part in every step, so every unit
/// converges whatever the cube size.
pub fn plane_sum<F: Float, C: PlaneCollective>(
    ctx: &PlaneContext<'_, C>,
    value: Lanes<F>,
) -> Lanes<F> {
    let num_units = value.num_units();
    let width = Ord::min(ctx.plane_dim_checked().next_power_of_two(), ctx.plane_dim());
    let padded = num_units.div_ceil(width) * width;

    let mut acc = value;
    acc.resize(padded, F::zero());

    let mut offset = 1;
    while offset < width {
        let shuffled = ctx.plane_shuffle_xor(&acc, offset);
        acc += shuffled;
        offset *= 2;
    }

    acc.resize(num_units, F::zero());
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[derive(Default, Debug)]
    struct Permute;

    impl PlaneCollective for Permute {
        fn shuffle_xor<F: Float>(&self, values: &Lanes<F>, mask: u32) -> Lanes<F> {
            Lanes::from_fn(values.num_units(), |unit_pos| {
                values.unit(unit_pos ^ mask).unwrap_or_else(F::zero)
            })
        }
    }

    fn iota(num_units: u32) -> Lanes<f32> {
        Lanes::from_fn(num_units, |unit_pos| unit_pos as f32 + 1.0)
    }

    #[test_log::test]
    fn every_unit_converges_on_power_of_two_cubes() {
        for num_units in [1, 2, 4, 8, 16, 32] {
            let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(num_units), 32);
            let sum = plane_sum(&ctx, iota(num_units));

            let expected = (num_units * (num_units + 1) / 2) as f32;
            assert_eq!(sum.as_slice(), vec![expected; num_units as usize].as_slice());
        }
    }

    #[test_log::test]
    fn every_unit_converges_on_partial_planes() {
        for num_units in [3, 5, 6, 7, 13, 31] {
            let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(num_units), 32);
            let sum = plane_sum(&ctx, iota(num_units));

            let expected = (num_units * (num_units + 1) / 2) as f32;
            assert_eq!(sum.as_slice(), vec![expected; num_units as usize].as_slice());
        }
    }

    #[test_log::test]
    fn random_registers_converge_on_every_cube_size() {
        let mut rng = StdRng::seed_from_u64(17);

        for num_units in 1..=32 {
            // Integers keep every partial sum exact.
            let value = Lanes::from_fn(num_units, |_| rng.random_range(-100..100) as f32);
            let expected: f32 = value.iter().sum();

            let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(num_units), 32);
            let sum = plane_sum(&ctx, value);

            assert_eq!(sum.as_slice(), vec![expected; num_units as usize].as_slice());
        }
    }

    #[test_log::test]
    fn resize_pads_and_truncates() {
        let mut lanes = Lanes::from(vec![1.0f32, 2.0]);
        lanes.resize(4, 0.0);
        assert_eq!(lanes.as_slice(), &[1.0, 2.0, 0.0, 0.0]);

        lanes.resize(1, 0.0);
        assert_eq!(lanes.as_slice(), &[1.0]);
    }

    #[test_log::test]
    fn last_partial_plane_converges() {
        let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(6), 4);
        let sum = plane_sum(&ctx, iota(6));

        assert_eq!(sum.as_slice(), &[10.0, 10.0, 10.0, 10.0, 11.0, 11.0]);
    }

    #[test_log::test]
    fn planes_reduce_independently() {
        let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(8), 4);
        let sum = plane_sum(&ctx, iota(8));

        assert_eq!(sum.as_slice(), &[10.0, 10.0, 10.0, 10.0, 26.0, 26.0, 26.0, 26.0]);
    }

    #[test_log::test]
    fn plane_dim_is_clamped_to_the_cube() {
        let ctx = PlaneContext::new(&Permute, CubeDim::new_2d(2, 2), 32);

        assert_eq!(ctx.cube_dim(), 4);
        assert_eq!(ctx.plane_dim(), 32);
        assert_eq!(ctx.plane_dim_checked(), 4);
        assert_eq!(ctx.unit_pos().as_slice(), &[0, 1, 2, 3]);
    }

    #[test_log::test]
    fn lanes_add_per_unit() {
        let mut lhs = Lanes::from(vec![1.0f64, 2.0, 3.0]);
        lhs += Lanes::from(vec![0.5, 0.5, -3.0]);

        assert_eq!(lhs.as_slice(), &[1.5, 2.5, 0.0]);
        assert_eq!(lhs.map(|value| value * 2.0).unit(1), Some(5.0));
        assert_eq!(lhs.unit(3), None);
    }
}
