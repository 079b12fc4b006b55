#![warn(missing_docs)]

//! Host-side runtime plumbing for lanesum: configuration, logging, launch geometry,
//! device properties, kernel metadata and the compute client that owns device memory.

#[macro_use]
extern crate derive_new;

/// Compute client module.
pub mod client;
/// Global configuration module.
pub mod config;
/// Launch errors.
pub mod server;
/// Compute storage module.
pub mod storage;
/// Launch checks against the hardware limits.
pub mod validation;

mod backtrace;
mod geometry;
mod metadata;
mod properties;

pub use backtrace::*;
pub use geometry::*;
pub use metadata::*;
pub use properties::*;
