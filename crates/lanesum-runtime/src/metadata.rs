//! Metadata helpers to easily get offsets into the `info` side channel.
//!
//! Conceptually, metadata is represented like this:
//! ```ignore
//! struct Metadata<const NUM_BUFS: usize> {
//!     buffer_lengths: [u32; NUM_BUFS],
//!     logical_lengths: [u32; NUM_BUFS],
//! }
//! ```
//! Every field has a constant offset that only depends on the number of bound buffers, so a
//! kernel can read the length of its `n`-th binding at a position known before launch.

const BUFFER_LEN: u32 = 0;
const LENGTH: u32 = 1;
const BASE_LEN: u32 = 2;

/// Helper to calculate metadata offsets based on buffer count and position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    num_meta: u32,
}

impl Metadata {
    /// Offsets for a kernel with `num_meta` bound buffers.
    pub const fn new(num_meta: u32) -> Self {
        Self { num_meta }
    }

    const fn offset_of(&self, id: u32) -> u32 {
        self.num_meta * id
    }

    /// Number of `u32` values in the serialized metadata.
    pub const fn static_len(&self) -> u32 {
        self.num_meta * BASE_LEN
    }

    /// Position of the allocated length (in elements) of the given buffer.
    pub const fn buffer_len_index(&self, buffer_idx: u32) -> u32 {
        self.offset_of(BUFFER_LEN) + buffer_idx
    }

    /// Position of the logical length (in elements) of the given buffer.
    pub const fn len_index(&self, buffer_idx: u32) -> u32 {
        self.offset_of(LENGTH) + buffer_idx
    }
}

/// Serialized metadata handed to a kernel next to its bindings.
#[derive(new, Clone, Debug, PartialEq, Eq)]
pub struct MetadataBinding {
    /// The `info` values.
    pub data: Vec<u32>,
    /// Number of values with a constant offset.
    pub static_len: usize,
}

/// Builder for a serialized metadata struct.
///
/// Arrays must be added in the same order they're bound to the kernel.
#[derive(Default)]
pub struct MetadataBuilder {
    buffer_lens: Vec<u32>,
    lengths: Vec<u32>,
}

impl MetadataBuilder {
    /// Add an array to a builder.
    pub fn with_array(&mut self, buffer_len: u32, len: u32) {
        self.buffer_lens.push(buffer_len);
        self.lengths.push(len);
    }

    /// Build the final serialized metadata struct.
    pub fn finish(self) -> MetadataBinding {
        let static_len = Metadata::new(self.lengths.len() as u32).static_len() as usize;

        let mut meta = self.buffer_lens;
        meta.extend(self.lengths);

        debug_assert_eq!(meta.len(), static_len);
        MetadataBinding::new(meta, static_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_array_length_is_second_value() {
        let mut builder = MetadataBuilder::default();
        builder.with_array(8, 5);
        let binding = builder.finish();

        let metadata = Metadata::new(1);
        assert_eq!(binding.data, vec![8, 5]);
        assert_eq!(binding.static_len, metadata.static_len() as usize);
        assert_eq!(binding.data[metadata.buffer_len_index(0) as usize], 8);
        assert_eq!(binding.data[metadata.len_index(0) as usize], 5);
    }

    #[test]
    fn lengths_follow_buffer_lengths() {
        let mut builder = MetadataBuilder::default();
        builder.with_array(16, 10);
        builder.with_array(4, 3);
        let binding = builder.finish();

        let metadata = Metadata::new(2);
        assert_eq!(binding.data, vec![16, 4, 10, 3]);
        assert_eq!(binding.data[metadata.len_index(1) as usize], 3);
        assert_eq!(binding.data[metadata.buffer_len_index(1) as usize], 4);
    }
}
