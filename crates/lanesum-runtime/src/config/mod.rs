/// Device config module.
pub mod device;
/// Launch config module.
pub mod launch;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
