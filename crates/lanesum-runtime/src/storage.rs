use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashMap;

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of an allocation.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandleId {
    value: u64,
}

impl HandleId {
    fn new() -> Self {
        Self {
            value: HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// Handle to a buffer allocated by a [compute client](crate::client::ComputeClient).
///
/// The handle doesn't own the memory, the client storage does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handle {
    /// The id of the allocation.
    pub id: HandleId,
    /// The size of the allocation in bytes.
    pub size: usize,
}

/// Buffers kept in host memory and indexed by [handle](Handle).
#[derive(Default, Debug)]
pub struct BytesStorage {
    memory: HashMap<HandleId, Vec<u8>>,
}

impl BytesStorage {
    /// Store `data` and return a handle to it.
    pub fn alloc(&mut self, data: Vec<u8>) -> Handle {
        let handle = Handle {
            id: HandleId::new(),
            size: data.len(),
        };
        self.memory.insert(handle.id, data);
        handle
    }

    /// Access the bytes behind a handle.
    pub fn get(&self, handle: &Handle) -> Option<&[u8]> {
        self.memory.get(&handle.id).map(Vec::as_slice)
    }

    /// Mutably access the bytes behind a handle.
    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut [u8]> {
        self.memory.get_mut(&handle.id).map(Vec::as_mut_slice)
    }

    /// Release the allocation behind a handle.
    pub fn dealloc(&mut self, handle: &Handle) {
        self.memory.remove(&handle.id);
    }

    /// Number of live allocations.
    pub fn num_allocations(&self) -> usize {
        self.memory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let mut storage = BytesStorage::default();
        let first = storage.alloc(vec![1, 2]);
        let second = storage.alloc(vec![3]);

        assert_ne!(first.id, second.id);
        assert_eq!(storage.get(&first), Some([1u8, 2].as_slice()));
        assert_eq!(second.size, 1);
    }

    #[test]
    fn dealloc_forgets_the_buffer() {
        let mut storage = BytesStorage::default();
        let handle = storage.alloc(vec![0; 4]);
        storage.dealloc(&handle);

        assert!(storage.get(&handle).is_none());
        assert_eq!(storage.num_allocations(), 0);
    }
}
