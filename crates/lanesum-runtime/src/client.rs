use crate::{
    config::{Logger, launch::LaunchLogLevel},
    server::LaunchError,
    storage::{BytesStorage, Handle},
    BackTrace, DeviceProperties, Feature,
};
use core::fmt::Display;
use std::sync::Arc;

/// The compute client is the entry point to allocate memory, read it back and run kernels on a
/// device.
///
/// It is cheap to clone: every clone shares the same storage, properties and logger.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    storage: Arc<spin::Mutex<BytesStorage>>,
    properties: Arc<DeviceProperties>,
    logger: Arc<spin::Mutex<Logger>>,
}

impl ComputeClient {
    /// Create a new client with the given device properties.
    pub fn new(properties: DeviceProperties, logger: Logger) -> Self {
        Self {
            storage: Arc::new(spin::Mutex::new(BytesStorage::default())),
            properties: Arc::new(properties),
            logger: Arc::new(spin::Mutex::new(logger)),
        }
    }

    /// Given bytes, store them and return a handle to the allocation.
    pub fn create(&self, data: &[u8]) -> Handle {
        self.storage.lock().alloc(data.to_vec())
    }

    /// Reserve `size` zeroed bytes and return a handle to the allocation.
    pub fn empty(&self, size: usize) -> Handle {
        self.storage.lock().alloc(vec![0; size])
    }

    /// Read the bytes behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was created by another client or was released.
    pub fn read_one(&self, handle: &Handle) -> Vec<u8> {
        match self.storage.lock().get(handle) {
            Some(bytes) => bytes.to_vec(),
            None => panic!("The handle {:?} isn't owned by this client", handle.id),
        }
    }

    /// Release the allocation behind a handle.
    pub fn release(&self, handle: Handle) {
        let mut storage = self.storage.lock();
        storage.dealloc(&handle);
        log::trace!(
            "Released {:?}, {} allocations left",
            handle.id,
            storage.num_allocations()
        );
    }

    /// Get the features and hardware limits supported by the device.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Check if the provided feature is supported by the device.
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        self.properties.feature_enabled(feature)
    }

    /// Run `task` on the bytes behind `handle`.
    ///
    /// The storage is locked for the whole task, so launches on the same client are serialized.
    pub fn execute<T>(
        &self,
        handle: &Handle,
        task: impl FnOnce(&mut [u8]) -> T,
    ) -> Result<T, LaunchError> {
        let mut storage = self.storage.lock();
        let bytes = storage
            .get_mut(handle)
            .ok_or_else(|| LaunchError::UnknownHandle {
                id: handle.id,
                backtrace: BackTrace::capture(),
            })?;

        Ok(task(bytes))
    }

    /// Log a launch message, only formatting it when a sink is active and the configured
    /// level is at least `level`.
    pub fn log_launch<S: Display>(&self, level: LaunchLogLevel, msg: impl FnOnce() -> S) {
        let mut logger = self.logger.lock();

        let enabled = match (logger.log_level_launch(), level) {
            (LaunchLogLevel::Disabled, _) | (_, LaunchLogLevel::Disabled) => false,
            (LaunchLogLevel::Basic, LaunchLogLevel::Full) => false,
            _ => true,
        };

        if enabled && logger.is_active() {
            logger.log_launch(&msg());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GlobalConfig, CubeDim, HardwareProperties};
    use pretty_assertions::assert_eq;

    fn client() -> ComputeClient {
        let hardware = HardwareProperties {
            plane_size_min: 32,
            plane_size_max: 32,
            max_units_per_cube: 1024,
            max_cube_dim: CubeDim::new_3d(1024, 1024, 64),
            max_cube_count: (u32::MAX, u16::MAX as u32, u16::MAX as u32),
        };
        ComputeClient::new(
            DeviceProperties::new(&[Feature::Plane], hardware),
            Logger::from_config(Arc::new(GlobalConfig::default())),
        )
    }

    #[test_log::test]
    fn created_resource_is_the_same_when_read() {
        let client = client();
        let handle = client.create(&[0, 1, 2]);

        assert_eq!(client.read_one(&handle), vec![0, 1, 2]);
    }

    #[test_log::test]
    fn empty_allocates_zeroed_memory() {
        let client = client();
        let handle = client.empty(4);

        assert_eq!(client.read_one(&handle), vec![0; 4]);
    }

    #[test_log::test]
    fn execute_mutates_in_place() {
        let client = client();
        let handle = client.create(&[1, 2, 3]);

        let len = client
            .execute(&handle, |bytes| {
                bytes[0] = 9;
                bytes.len()
            })
            .unwrap();

        assert_eq!(len, 3);
        assert_eq!(client.read_one(&handle), vec![9, 2, 3]);
    }

    #[test_log::test]
    fn execute_on_released_handle_fails() {
        let client = client();
        let handle = client.create(&[1]);
        client.release(handle.clone());

        let result = client.execute(&handle, |_| ());
        assert!(matches!(result, Err(LaunchError::UnknownHandle { .. })));
    }

    #[test_log::test]
    fn clones_share_storage() {
        let client = client();
        let handle = client.create(&[4, 2]);

        assert_eq!(client.clone().read_one(&handle), vec![4, 2]);
        assert!(client.feature_enabled(Feature::Plane));
    }
}
