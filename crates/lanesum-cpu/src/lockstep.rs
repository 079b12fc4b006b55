use lanesum_core::{Float, Lanes, PlaneCollective, Runtime};
use lanesum_runtime::client::ComputeClient;

use crate::device::create_client;

static CLIENT: spin::Once<ComputeClient> = spin::Once::new();

/// Runs all units of a plane together on the calling thread.
#[derive(Debug)]
pub struct LockstepRuntime;

/// Shuffles by reading the partner's slot of the register directly.
#[derive(Default, Debug)]
pub struct LockstepCollective;

impl PlaneCollective for LockstepCollective {
    fn shuffle_xor<F: Float>(&self, values: &Lanes<F>, mask: u32) -> Lanes<F> {
        Lanes::from_fn(values.num_units(), |unit_pos| {
            values.unit(unit_pos ^ mask).unwrap_or_else(F::zero)
        })
    }
}

impl Runtime for LockstepRuntime {
    type Collective = LockstepCollective;

    fn client() -> ComputeClient {
        CLIENT.call_once(|| create_client(Self::name())).clone()
    }

    fn name() -> &'static str {
        "lockstep"
    }
}
