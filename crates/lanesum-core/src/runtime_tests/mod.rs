#![allow(missing_docs)]

pub mod launch;
pub mod plane;

pub use paste;
pub use test_log;

use crate::Float;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Asserts every value is within the summation tolerance of the expected one.
pub(crate) fn assert_equals_approx<F: Float>(actual: &[F], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "Buffers have different lengths");

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let (a, e) = (a.as_f64(), *e);
        assert!(
            (a - e).abs() <= epsilon,
            "Values differ more than epsilon: actual={}, expected={}, difference={}, epsilon={}
index: {}
actual: {:?}
expected: {:?}",
            a,
            e,
            (a - e).abs(),
            epsilon,
            i,
            actual,
            expected
        );
    }
}

/// Tolerance for summing `values` as a tree with the precision of `F`, compared to
/// [`reference_sum`].
pub(crate) fn sum_tolerance<F: Float>(values: &[F]) -> f64 {
    let magnitude: f64 = values.iter().map(|value| value.as_f64().abs()).sum();
    let steps = (values.len().max(2) as f64).log2().ceil() + 1.0;

    (F::epsilon().as_f64() * steps + f64::EPSILON * values.len() as f64) * magnitude
}

/// Reference sum, accumulated in `f64`.
pub(crate) fn reference_sum<F: Float>(values: &[F]) -> f64 {
    values.iter().map(|value| value.as_f64()).sum()
}

pub(crate) fn random_values<F: Float>(seed: u64, len: usize) -> Vec<F> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| F::new(rng.random_range(-10.0f32..10.0)))
        .collect()
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! testgen_all {
    () => {
        $crate::testgen_all!([f32]);
    };
    ([$($float:ident),*]) => {
        mod plane {
            use super::*;
            use $crate::Runtime;
            #[allow(unused_imports)]
            use $crate::{bf16, f16};

            $crate::runtime_tests::paste::paste! {
                $(
                    mod [<$float _ty>] {
                        type FloatType = $float;

                        $crate::testgen_plane!();
                    }
                )*
            }
        }

        mod launch {
            use $crate::Runtime;

            $crate::testgen_launch!();
        }
    };
}
