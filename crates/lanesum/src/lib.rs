pub use lanesum_core::*;

pub use lanesum_runtime as runtime;

#[cfg(feature = "cpu")]
pub use lanesum_cpu as cpu;
