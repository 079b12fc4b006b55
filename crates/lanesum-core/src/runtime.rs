use lanesum_runtime::client::ComputeClient;

use crate::PlaneCollective;

/// Runtime for the lanesum kernels.
pub trait Runtime: Send + Sync + 'static + core::fmt::Debug {
    /// How units of a plane exchange values on this runtime.
    type Collective: PlaneCollective;

    /// Retrieve the compute client of the runtime, creating it on first use.
    fn client() -> ComputeClient;

    /// The runtime name.
    fn name() -> &'static str;
}
