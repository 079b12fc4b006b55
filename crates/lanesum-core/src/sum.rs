use lanesum_runtime::{
    client::ComputeClient,
    config::launch::LaunchLogLevel,
    server::{LaunchError, ResourceLimitError},
    storage::Handle,
    validation::{validate_cube_count, validate_cube_dim, validate_units},
    BackTrace, CubeCount, CubeDim, Feature, Metadata, MetadataBuilder,
};

use crate::{plane_sum, Float, PlaneCollective, PlaneContext, Runtime};

/// Position of the output length in the `info` side channel.
const OUTPUT_LEN: usize = Metadata::new(1).len_index(0) as usize;

/// Sum the first `len` values of `output` into `output[0]`, where `len` is read from `info`.
///
/// Each unit loads at most one value and units past `len` contribute zero, so the cube must
/// not be bigger than a plane. Only unit 0 commits, and nothing is written when `len` is zero.
///
/// # Panics
///
/// If `info` is shorter than the metadata of a single array.
pub fn kernel_sum<F: Float, C: PlaneCollective>(
    ctx: &PlaneContext<'_, C>,
    output: &mut [F],
    info: &[u32],
) {
    let len = info[OUTPUT_LEN];

    // Out-of-bounds reads return zero, like a checked launch.
    let value = ctx.unit_pos().map(|unit_pos| match unit_pos < len {
        true => output.get(unit_pos as usize).copied().unwrap_or_else(F::zero),
        false => F::zero(),
    });

    let sum = plane_sum(ctx, value);

    for (unit_pos, sum) in ctx.unit_pos().iter().zip(sum.iter()) {
        if unit_pos == 0 && 0 < len {
            if let Some(first) = output.first_mut() {
                *first = sum;
            }
        }
    }
}

/// An array binding: a handle and the number of valid elements it holds.
#[derive(new, Clone, Copy, Debug)]
pub struct ArrayArg<'a> {
    /// The buffer holding the elements.
    pub handle: &'a Handle,
    /// Number of valid elements, starting at the beginning of the buffer.
    pub length: usize,
}

impl<'a> ArrayArg<'a> {
    /// Create an array argument from a handle and its number of valid elements.
    pub fn from_raw_parts(handle: &'a Handle, length: usize) -> Self {
        Self::new(handle, length)
    }
}

/// Launch [`kernel_sum`] after checking that the launch stays inside a single plane and that
/// every valid element has a unit to load it.
pub fn launch<F: Float, R: Runtime>(
    client: &ComputeClient,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    output: ArrayArg<'_>,
) -> Result<(), LaunchError> {
    validate::<F>(client, cube_count, cube_dim, &output)
        .inspect_err(|err| log::debug!("Rejected the launch of kernel_sum: {err}"))?;
    execute::<F, R>(client, cube_count, cube_dim, output)
}

/// Launch [`kernel_sum`] without checking the launch against what the kernel needs.
///
/// The hardware limits of the device still apply: cube dims, unit counts and cube counts it
/// can't dispatch are rejected with [`LaunchError::TooManyResources`]. A cube bigger than a plane reduces each plane on its own and unit 0 only commits the sum of
/// the first plane. Every cube of `cube_count` runs, one after the other, on the same buffer.
pub fn launch_unchecked<F: Float, R: Runtime>(
    client: &ComputeClient,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    output: ArrayArg<'_>,
) -> Result<(), LaunchError> {
    execute::<F, R>(client, cube_count, cube_dim, output)
}

fn validate<F: Float>(
    client: &ComputeClient,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    output: &ArrayArg<'_>,
) -> Result<(), LaunchError> {
    if !client.feature_enabled(Feature::Plane) {
        return Err(LaunchError::MissingFeature {
            feature: Feature::Plane,
        });
    }

    if cube_count.as_tuple() != (1, 1, 1) {
        return Err(ResourceLimitError::CubeCount {
            requested: cube_count.as_tuple(),
            max: (1, 1, 1),
            backtrace: BackTrace::capture(),
        }
        .into());
    }

    let num_units = validate_units(cube_dim, client.properties().plane_dim())?;

    let buffer_len = output.handle.size / core::mem::size_of::<F>();

    if output.length > buffer_len {
        return Err(LaunchError::invalid_binding(format!(
            "The array length {} exceeds the {buffer_len} elements of its buffer",
            output.length
        )));
    }

    if output.length > num_units as usize {
        return Err(LaunchError::invalid_binding(format!(
            "The array length {} exceeds the {num_units} units launched, each unit loads at most one element",
            output.length
        )));
    }

    Ok(())
}

fn execute<F: Float, R: Runtime>(
    client: &ComputeClient,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    output: ArrayArg<'_>,
) -> Result<(), LaunchError> {
    let properties = client.properties();
    validate_cube_dim(properties, cube_dim)?;
    validate_units(cube_dim, properties.hardware.max_units_per_cube)?;
    let num_cubes = validate_cube_count(cube_count, properties.hardware.max_cube_count)?;

    let elem_size = core::mem::size_of::<F>();

    if output.handle.size % elem_size != 0 {
        return Err(LaunchError::invalid_binding(format!(
            "A buffer of {} bytes doesn't hold a whole number of {elem_size} bytes elements",
            output.handle.size
        )));
    }

    let (Ok(buffer_len), Ok(len)) = (
        u32::try_from(output.handle.size / elem_size),
        u32::try_from(output.length),
    ) else {
        return Err(LaunchError::invalid_binding(
            "Array lengths must fit in the u32 metadata",
        ));
    };

    let mut metadata = MetadataBuilder::default();
    metadata.with_array(buffer_len, len);
    let info = metadata.finish();

    client.log_launch(LaunchLogLevel::Basic, || {
        format!(
            "[{}] kernel_sum<{}> cube_count {cube_count:?} cube_dim {cube_dim:?}",
            R::name(),
            core::any::type_name::<F>()
        )
    });

    let collective = R::Collective::default();
    let ctx = PlaneContext::new(&collective, cube_dim, properties.plane_dim());

    let committed = client.execute(output.handle, |bytes| {
        let mut buffer = F::from_bytes(bytes);

        for _ in 0..num_cubes {
            kernel_sum(&ctx, &mut buffer, &info.data);
        }

        bytes.copy_from_slice(F::as_bytes(&buffer));
        buffer.first().copied()
    })?;

    client.log_launch(LaunchLogLevel::Full, || {
        format!(
            "[{}] kernel_sum info {:?} output[0] = {committed:?}",
            R::name(),
            info.data
        )
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lanes;
    use pretty_assertions::assert_eq;

    #[derive(Default, Debug)]
    struct Permute;

    impl PlaneCollective for Permute {
        fn shuffle_xor<F: Float>(&self, values: &Lanes<F>, mask: u32) -> Lanes<F> {
            Lanes::from_fn(values.num_units(), |unit_pos| {
                values.unit(unit_pos ^ mask).unwrap_or_else(F::zero)
            })
        }
    }

    fn run(buffer: &mut [f32], len: u32, num_units: u32) {
        let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(num_units), 32);
        let info = [buffer.len() as u32, len];
        kernel_sum(&ctx, buffer, &info);
    }

    #[test_log::test]
    fn sums_the_valid_prefix() {
        let mut buffer = [1.0, 2.0, 3.0, 4.0, 100.0, 200.0];
        run(&mut buffer, 4, 32);

        assert_eq!(buffer, [10.0, 2.0, 3.0, 4.0, 100.0, 200.0]);
    }

    #[test_log::test]
    fn empty_array_is_never_written() {
        let mut buffer = [5.0];
        run(&mut buffer, 0, 32);
        run(&mut buffer, 0, 1);

        assert_eq!(buffer, [5.0]);
    }

    #[test_log::test]
    fn single_element_is_kept() {
        let mut buffer = [7.5];
        run(&mut buffer, 1, 1);

        assert_eq!(buffer, [7.5]);
    }

    #[test_log::test]
    fn reads_past_the_buffer_are_zero() {
        let mut buffer = [1.0, 2.0];
        run(&mut buffer, 4, 4);

        assert_eq!(buffer, [3.0, 2.0]);
    }

    #[test_log::test]
    #[should_panic]
    fn info_without_length_panics() {
        let ctx = PlaneContext::new(&Permute, CubeDim::new_1d(4), 32);
        kernel_sum(&ctx, &mut [1.0f32, 2.0], &[2]);
    }

    #[test_log::test]
    fn length_is_read_at_a_fixed_position() {
        assert_eq!(OUTPUT_LEN, 1);
    }
}
