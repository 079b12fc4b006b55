use std::{
    panic,
    sync::Barrier,
    thread,
};

use lanesum_core::{Float, Lanes, PlaneCollective, Runtime};
use lanesum_runtime::client::ComputeClient;
use spin::Mutex;

use crate::device::create_client;

static CLIENT: spin::Once<ComputeClient> = spin::Once::new();

/// Runs every unit of a plane on its own thread during collectives.
///
/// Each shuffle step spawns one scoped thread per unit and joins them before the next step.
/// The rest of the kernel (loads, adds, the commit) runs on the calling thread.
#[derive(Debug)]
pub struct ThreadedRuntime;

/// Shuffles through shared memory.
///
/// Each unit stores its value in its own slot, waits on a barrier until the whole plane has
/// stored, then loads the slot of its partner. Slots past the launched units don't exist, so
/// idle partners read as zero.
#[derive(Default, Debug)]
pub struct ThreadedCollective;

impl PlaneCollective for ThreadedCollective {
    fn shuffle_xor<F: Float>(&self, values: &Lanes<F>, mask: u32) -> Lanes<F> {
        let num_units = values.num_units() as usize;
        let shared: Vec<Mutex<F>> = (0..num_units).map(|_| Mutex::new(F::zero())).collect();
        let barrier = Barrier::new(num_units);

        log::trace!("Shuffling with mask {mask} over {num_units} unit threads");

        let received = thread::scope(|scope| {
            let units: Vec<_> = values
                .iter()
                .zip(0..)
                .map(|(value, unit_pos)| {
                    let (shared, barrier) = (&shared, &barrier);
                    scope.spawn(move || unit_shuffle_xor(unit_pos, value, mask, shared, barrier))
                })
                .collect();

            units
                .into_iter()
                .map(|unit| unit.join().unwrap_or_else(|err| panic::resume_unwind(err)))
                .collect::<Vec<F>>()
        });

        Lanes::from(received)
    }
}

fn unit_shuffle_xor<F: Float>(
    unit_pos: u32,
    value: F,
    mask: u32,
    shared: &[Mutex<F>],
    barrier: &Barrier,
) -> F {
    *shared[unit_pos as usize].lock() = value;

    // Every store must land before any partner loads.
    barrier.wait();

    shared
        .get((unit_pos ^ mask) as usize)
        .map(|slot| *slot.lock())
        .unwrap_or_else(F::zero)
}

impl Runtime for ThreadedRuntime {
    type Collective = ThreadedCollective;

    fn client() -> ComputeClient {
        CLIENT.call_once(|| create_client(Self::name())).clone()
    }

    fn name() -> &'static str {
        "threaded"
    }
}
