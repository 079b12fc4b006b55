use core::fmt::{Debug, Display};
use half::{bf16, f16};

/// Floating-point element that can be stored in a buffer and summed by a plane.
pub trait Float:
    num_traits::Float
    + core::ops::AddAssign
    + bytemuck::Pod
    + Send
    + Sync
    + Debug
    + Display
    + 'static
{
    /// Create the element from an `f32`, rounding when the element is narrower.
    fn new(val: f32) -> Self;

    /// Widen the element to an `f64`.
    fn as_f64(self) -> f64;

    /// Convert a slice of elements into its byte representation.
    fn as_bytes(slice: &[Self]) -> &[u8] {
        bytemuck::cast_slice(slice)
    }

    /// Copy elements out of bytes, regardless of their alignment.
    ///
    /// Trailing bytes that don't form a whole element are ignored.
    fn from_bytes(bytes: &[u8]) -> Vec<Self> {
        bytes
            .chunks_exact(core::mem::size_of::<Self>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

macro_rules! impl_float {
    ($ty:ty, $from_f32:path, $to_f64:path) => {
        impl Float for $ty {
            fn new(val: f32) -> Self {
                $from_f32(val)
            }

            fn as_f64(self) -> f64 {
                $to_f64(self)
            }
        }
    };
}

impl_float!(f32, core::convert::identity, f64::from);
impl_float!(f64, f64::from, core::convert::identity);
impl_float!(f16, f16::from_f32, f16::to_f64);
impl_float!(bf16, bf16::from_f32, bf16::to_f64);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test_log::test]
    fn bytes_round_trip_unaligned() {
        let values = [1.5f32, -2.0, 3.25];
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(f32::as_bytes(&values));

        assert_eq!(f32::from_bytes(&bytes[1..]), values.to_vec());
    }

    #[test_log::test]
    fn partial_trailing_element_is_ignored() {
        let mut bytes = f64::as_bytes(&[4.0]).to_vec();
        bytes.push(7);

        assert_eq!(f64::from_bytes(&bytes), vec![4.0]);
    }

    #[test_log::test]
    fn half_precision_widens() {
        assert_eq!(f16::new(0.5).as_f64(), 0.5);
        assert_eq!(bf16::new(-8.0).as_f64(), -8.0);
    }
}
