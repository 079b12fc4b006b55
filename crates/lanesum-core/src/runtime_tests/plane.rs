use crate::prelude::*;
use crate::runtime_tests::{assert_equals_approx, random_values, reference_sum, sum_tolerance};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn read<F: Float>(client: &ComputeClient, handle: &Handle) -> Vec<F> {
    F::from_bytes(&client.read_one(handle))
}

/// Launch the sum on a single cube of `num_units` and return the buffer afterward.
fn run_plane_sum<R: Runtime, F: Float>(
    client: &ComputeClient,
    input: &[F],
    length: usize,
    num_units: u32,
) -> Vec<F> {
    let handle = client.create(F::as_bytes(input));

    launch::<F, R>(
        client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(num_units),
        ArrayArg::from_raw_parts(&handle, length),
    )
    .unwrap();

    read(client, &handle)
}

fn test_plane_operation<R: Runtime, F: Float>(
    client: ComputeClient,
    input: &[F],
    length: usize,
    num_units: u32,
) {
    if !client.feature_enabled(Feature::Plane) {
        // Can't execute the test.
        return;
    }

    let tolerance = sum_tolerance(&input[..length]);
    let expected = match length {
        0 => input[0].as_f64(),
        _ => reference_sum(&input[..length]),
    };

    let actual = run_plane_sum::<R, F>(&client, input, length, num_units);

    // Only the first element may change.
    assert_eq!(actual[1..], input[1..]);
    assert_equals_approx(&actual[..1], &[expected], tolerance);
}

pub fn test_plane_sum<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let input: Vec<F> = (0..plane_dim).map(|x| F::new(x as f32)).collect();

    let actual = run_plane_sum::<R, F>(&client, &input, input.len(), plane_dim);

    let mut expected = input.clone();
    expected[0] = F::new((plane_dim * (plane_dim - 1) / 2) as f32);
    assert_eq!(actual, expected);
}

pub fn test_plane_sum_prefix<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let mut input: Vec<F> = vec![F::new(9.0); plane_dim as usize];
    for (i, value) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
        input[i] = F::new(value);
    }

    let actual = run_plane_sum::<R, F>(&client, &input, 4, plane_dim);

    assert_eq!(actual[0], F::new(10.0));
    assert_eq!(actual[1..4], [F::new(2.0), F::new(3.0), F::new(4.0)]);
    assert!(actual[4..].iter().all(|value| *value == F::new(9.0)));
}

pub fn test_plane_sum_single_element<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let actual = run_plane_sum::<R, F>(&client, &[F::new(7.5)], 1, plane_dim);

    assert_eq!(actual, [F::new(7.5)]);
}

pub fn test_plane_sum_empty<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let handle = client.create(F::as_bytes(&[F::new(5.0)]));

    for _ in 0..2 {
        launch::<F, R>(
            &client,
            CubeCount::Static(1, 1, 1),
            CubeDim::new_1d(plane_dim),
            ArrayArg::from_raw_parts(&handle, 0),
        )
        .unwrap();

        assert_eq!(read::<F>(&client, &handle), [F::new(5.0)]);
    }
}

pub fn test_plane_sum_random_lengths<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();

    for length in 0..=plane_dim as usize {
        let input = random_values::<F>(length as u64, plane_dim as usize + 3);
        test_plane_operation::<R, F>(client.clone(), &input, length, plane_dim);
    }
}

pub fn test_plane_sum_permutation<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let mut rng = StdRng::seed_from_u64(7);
    let mut input = random_values::<F>(42, plane_dim as usize);

    let reference = run_plane_sum::<R, F>(&client, &input, input.len(), plane_dim)[0];
    let tolerance = 2.0 * sum_tolerance(&input);

    for _ in 0..4 {
        input.shuffle(&mut rng);
        let actual = run_plane_sum::<R, F>(&client, &input, input.len(), plane_dim)[0];

        assert_equals_approx(&[actual], &[reference.as_f64()], tolerance);
    }
}

pub fn test_plane_sum_small_cube<R: Runtime, F: Float>(client: ComputeClient) {
    let input: Vec<F> = (1..=8).map(|x| F::new(x as f32)).collect();

    test_plane_operation::<R, F>(client.clone(), &input, 8, 8);
    test_plane_operation::<R, F>(client.clone(), &input, 6, 8);
    test_plane_operation::<R, F>(client.clone(), &input[..5], 5, 5);
    test_plane_operation::<R, F>(client, &input, 3, 7);
}

pub fn test_plane_sum_2d_cube<R: Runtime, F: Float>(client: ComputeClient) {
    let input: Vec<F> = (1..=8).map(|x| F::new(x as f32)).collect();
    let handle = client.create(F::as_bytes(&input));

    launch::<F, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_2d(4, 2),
        ArrayArg::from_raw_parts(&handle, 8),
    )
    .unwrap();

    assert_eq!(read::<F>(&client, &handle)[0], F::new(36.0));
}

pub fn test_plane_sum_all_units_converge<R: Runtime, F: Float>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let collective = R::Collective::default();
    let ctx = PlaneContext::new(&collective, CubeDim::new_1d(plane_dim), plane_dim);

    let value = Lanes::from_fn(plane_dim, |unit_pos| F::new((unit_pos % 4) as f32));
    let sum = plane_sum(&ctx, value);

    let expected = F::new((plane_dim / 4 * 6) as f32);
    assert!(sum.iter().all(|value| value == expected), "{sum:?}");

    // Cubes that leave idle lanes in the plane.
    for num_units in [3, 5, 6, 7] {
        let ctx = PlaneContext::new(&collective, CubeDim::new_1d(num_units), plane_dim);
        let value = Lanes::from_fn(num_units, |unit_pos| F::new(unit_pos as f32 + 1.0));
        let sum = plane_sum(&ctx, value);

        let expected = F::new((num_units * (num_units + 1) / 2) as f32);
        assert_eq!(sum.num_units(), num_units);
        assert!(
            sum.iter().all(|value| value == expected),
            "cube {num_units}: {sum:?}"
        );
    }
}

pub fn test_plane_shuffle_xor<R: Runtime, F: Float>(_client: ComputeClient) {
    let collective = R::Collective::default();
    let value = Lanes::from_fn(6, |unit_pos| F::new(unit_pos as f32 + 1.0));

    let swapped = collective.shuffle_xor(&value, 1);
    let expected: Vec<F> = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0]
        .into_iter()
        .map(F::new)
        .collect();
    assert_eq!(swapped.as_slice(), expected.as_slice());

    // Partners 4 and 5 of units 0 and 1 exist, the partners of units 2 to 5 are idle.
    let idle = collective.shuffle_xor(&value, 4);
    let expected: Vec<F> = [5.0, 6.0, 0.0, 0.0, 1.0, 2.0]
        .into_iter()
        .map(F::new)
        .collect();
    assert_eq!(idle.as_slice(), expected.as_slice());
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! testgen_plane {
    () => {
        use super::*;

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum::<TestRuntime, FloatType>(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_prefix() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_prefix::<TestRuntime, FloatType>(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_single_element() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_single_element::<TestRuntime, FloatType>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_empty() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_empty::<TestRuntime, FloatType>(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_random_lengths() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_random_lengths::<TestRuntime, FloatType>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_permutation() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_permutation::<TestRuntime, FloatType>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_small_cube() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_small_cube::<TestRuntime, FloatType>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_2d_cube() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_2d_cube::<TestRuntime, FloatType>(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_sum_all_units_converge() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_sum_all_units_converge::<
                TestRuntime,
                FloatType,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_plane_shuffle_xor() {
            let client = TestRuntime::client();
            $crate::runtime_tests::plane::test_plane_shuffle_xor::<TestRuntime, FloatType>(client);
        }
    };
}
