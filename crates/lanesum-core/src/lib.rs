#![warn(missing_docs)]

//! The plane sum kernel and the lock-step lane model it is written against.

#[macro_use]
extern crate derive_new;

/// The sum kernel and its launch entry points.
pub mod sum;

mod element;
mod plane;
mod runtime;

pub use element::*;
pub use plane::*;
pub use runtime::*;

pub use half::{bf16, f16};

#[cfg(feature = "export_tests")]
pub mod runtime_tests;

/// Everything needed to launch the sum kernel.
pub mod prelude {
    pub use crate::sum::{kernel_sum, launch, launch_unchecked, ArrayArg};
    pub use crate::{plane_sum, Float, Lanes, PlaneCollective, PlaneContext, Runtime};
    pub use lanesum_runtime::{
        client::ComputeClient, server::LaunchError, storage::Handle, CubeCount, CubeDim,
        Feature,
    };
}
