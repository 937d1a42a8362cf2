//! Grammars for configuration formats, written with the [`prelude`](super::prelude).

pub mod pmlogger;

pub use pmlogger::{InstanceName, Interval, LogSpec, LogState, TimeUnit};
