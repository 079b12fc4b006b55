use crate::prelude::*;
use lanesum_runtime::{config::Logger, server::ResourceLimitError, DeviceProperties};

fn ones(len: usize) -> Vec<f32> {
    vec![1.0; len]
}

pub fn test_launch_rejects_missing_plane_feature<R: Runtime>(client: ComputeClient) {
    // Same device, without plane collectives.
    let properties = DeviceProperties::new(&[], client.properties().hardware.clone());
    let client = ComputeClient::new(properties, Logger::new());

    let input = ones(4);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(4),
        ArrayArg::from_raw_parts(&handle, 4),
    );

    assert!(
        matches!(
            result,
            Err(LaunchError::MissingFeature {
                feature: Feature::Plane
            })
        ),
        "{result:?}"
    );
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_multiple_cubes<R: Runtime>(client: ComputeClient) {
    let input = ones(4);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(2, 1, 1),
        CubeDim::new_1d(4),
        ArrayArg::from_raw_parts(&handle, 4),
    );

    match result {
        Err(LaunchError::TooManyResources(ResourceLimitError::CubeCount {
            requested, max, ..
        })) => {
            assert_eq!(requested, (2, 1, 1));
            assert_eq!(max, (1, 1, 1));
        }
        other => panic!("Expected a cube count error, got {other:?}"),
    }
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_cube_larger_than_plane<R: Runtime>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let input = ones(plane_dim as usize * 2);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(plane_dim * 2),
        ArrayArg::from_raw_parts(&handle, input.len()),
    );

    match result {
        Err(LaunchError::TooManyResources(ResourceLimitError::Units {
            requested, max, ..
        })) => {
            assert_eq!(requested, plane_dim * 2);
            assert_eq!(max, plane_dim);
        }
        other => panic!("Expected a unit count error, got {other:?}"),
    }
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_overflowing_cube_dim<R: Runtime>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let input = ones(4);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_3d(65536, 65536, 1),
        ArrayArg::from_raw_parts(&handle, 4),
    );

    match result {
        Err(LaunchError::TooManyResources(ResourceLimitError::Units {
            requested, max, ..
        })) => {
            assert_eq!(requested, u32::MAX);
            assert_eq!(max, plane_dim);
        }
        other => panic!("Expected a unit count error, got {other:?}"),
    }
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

/// The unchecked launch still refuses what the device can't dispatch.
pub fn test_launch_unchecked_enforces_hardware_limits<R: Runtime>(client: ComputeClient) {
    let hardware = client.properties().hardware.clone();
    let input = ones(4);
    let handle = client.create(f32::as_bytes(&input));

    let run = |cube_count: CubeCount, cube_dim: CubeDim| {
        launch_unchecked::<f32, R>(
            &client,
            cube_count,
            cube_dim,
            ArrayArg::from_raw_parts(&handle, 4),
        )
    };

    match run(
        CubeCount::Static(1, 1, 1),
        CubeDim::new_3d(1, 1, hardware.max_cube_dim.z + 1),
    ) {
        Err(LaunchError::TooManyResources(ResourceLimitError::CubeDim {
            requested, max, ..
        })) => {
            assert_eq!(requested, (1, 1, hardware.max_cube_dim.z + 1));
            assert_eq!(max, hardware.max_cube_dim.as_tuple());
        }
        other => panic!("Expected a cube dim error, got {other:?}"),
    }

    match run(
        CubeCount::Static(1, 1, 1),
        CubeDim::new_2d(hardware.max_units_per_cube, 2),
    ) {
        Err(LaunchError::TooManyResources(ResourceLimitError::Units {
            requested, max, ..
        })) => {
            assert_eq!(requested, hardware.max_units_per_cube * 2);
            assert_eq!(max, hardware.max_units_per_cube);
        }
        other => panic!("Expected a unit count error, got {other:?}"),
    }

    let result = run(CubeCount::Static(1, 1, 1), CubeDim::new_3d(65536, 65536, 1));
    assert!(
        matches!(
            result,
            Err(LaunchError::TooManyResources(
                ResourceLimitError::CubeDim { .. } | ResourceLimitError::Units { .. }
            ))
        ),
        "{result:?}"
    );

    let result = run(CubeCount::Static(u32::MAX, 2, 1), CubeDim::new_1d(4));
    assert!(
        matches!(
            result,
            Err(LaunchError::TooManyResources(ResourceLimitError::CubeCount { .. }))
        ),
        "{result:?}"
    );

    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_length_larger_than_units<R: Runtime>(client: ComputeClient) {
    let input = ones(16);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(8),
        ArrayArg::from_raw_parts(&handle, 16),
    );

    assert!(
        matches!(result, Err(LaunchError::InvalidBinding { .. })),
        "{result:?}"
    );
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_length_larger_than_buffer<R: Runtime>(client: ComputeClient) {
    let input = ones(2);
    let handle = client.create(f32::as_bytes(&input));

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(4),
        ArrayArg::from_raw_parts(&handle, 3),
    );

    assert!(
        matches!(result, Err(LaunchError::InvalidBinding { .. })),
        "{result:?}"
    );
    assert_eq!(f32::from_bytes(&client.read_one(&handle)), input);
}

pub fn test_launch_rejects_partial_elements<R: Runtime>(client: ComputeClient) {
    let handle = client.create(&[0u8; 6]);

    let result = launch_unchecked::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(1),
        ArrayArg::from_raw_parts(&handle, 1),
    );

    assert!(
        matches!(result, Err(LaunchError::InvalidBinding { .. })),
        "{result:?}"
    );
}

pub fn test_launch_rejects_released_handle<R: Runtime>(client: ComputeClient) {
    let handle = client.create(f32::as_bytes(&ones(1)));
    let released = handle.clone();
    client.release(handle);

    let result = launch::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(1),
        ArrayArg::from_raw_parts(&released, 1),
    );

    assert!(
        matches!(result, Err(LaunchError::UnknownHandle { .. })),
        "{result:?}"
    );
}

/// Without validation a cube of two planes reduces each plane on its own, and unit 0 commits
/// the sum of the first one.
pub fn test_launch_unchecked_reduces_first_plane<R: Runtime>(client: ComputeClient) {
    let plane_dim = client.properties().plane_dim();
    let input = ones(plane_dim as usize * 2);
    let handle = client.create(f32::as_bytes(&input));

    launch_unchecked::<f32, R>(
        &client,
        CubeCount::Static(1, 1, 1),
        CubeDim::new_1d(plane_dim * 2),
        ArrayArg::from_raw_parts(&handle, input.len()),
    )
    .unwrap();

    let actual = f32::from_bytes(&client.read_one(&handle));
    assert_eq!(actual[0], plane_dim as f32);
    assert_eq!(actual[1..], input[1..]);
}

/// Every cube runs on the same buffer, so a second cube sums the committed result again.
pub fn test_launch_unchecked_runs_every_cube<R: Runtime>(client: ComputeClient) {
    let input = [1.0f32, 2.0, 3.0, 4.0];
    let handle = client.create(f32::as_bytes(&input));

    launch_unchecked::<f32, R>(
        &client,
        CubeCount::Static(2, 1, 1),
        CubeDim::new_1d(4),
        ArrayArg::from_raw_parts(&handle, 4),
    )
    .unwrap();

    assert_eq!(
        f32::from_bytes(&client.read_one(&handle)),
        [19.0, 2.0, 3.0, 4.0]
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! testgen_launch {
    () => {
        use super::*;

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_missing_plane_feature() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_missing_plane_feature::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_multiple_cubes() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_multiple_cubes::<TestRuntime>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_cube_larger_than_plane() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_cube_larger_than_plane::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_overflowing_cube_dim() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_overflowing_cube_dim::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_unchecked_enforces_hardware_limits() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_unchecked_enforces_hardware_limits::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_length_larger_than_units() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_length_larger_than_units::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_length_larger_than_buffer() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_length_larger_than_buffer::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_partial_elements() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_partial_elements::<TestRuntime>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_rejects_released_handle() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_rejects_released_handle::<TestRuntime>(
                client,
            );
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_unchecked_reduces_first_plane() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_unchecked_reduces_first_plane::<
                TestRuntime,
            >(client);
        }

        #[$crate::runtime_tests::test_log::test]
        fn test_launch_unchecked_runs_every_cube() {
            let client = TestRuntime::client();
            $crate::runtime_tests::launch::test_launch_unchecked_runs_every_cube::<TestRuntime>(
                client,
            );
        }
    };
}
