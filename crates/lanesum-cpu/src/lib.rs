//! CPU runtimes for the lanesum kernels.
//!
//! [`LockstepRuntime`] steps every unit of a plane at once and shuffles by permuting a
//! register. [`ThreadedRuntime`] runs each unit on its own thread for every shuffle and
//! exchanges values through shared memory, which is how a plane behaves on hardware without
//! native shuffles.

#![warn(missing_docs)]


mod device;
mod lockstep;
mod threaded;

pub use lockstep::*;
pub use threaded::*;
