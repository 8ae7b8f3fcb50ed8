//! Pre-execution memory estimation for scheduler admission control.
//!
//! A [`ResourceEstimator`] is declared once per tool kind as an
//! [`EstimatorPolicy`]: which inputs drive memory use, how strongly, a fixed
//! overhead, and clamping bounds. Before a node is admitted to a worker slot
//! the scheduler calls [`ResourceEstimator::estimate`] with the node's input
//! values and receives an [`Estimate`]: the clamped memory in GB plus a
//! derivation trail for the run report.
//!
//! Image inputs contribute through their spatial voxel count, read from the
//! volume header only by a [`VolumeReader`].

#![warn(missing_docs)]

pub mod error;
pub mod estimator;
pub mod value;
pub mod volume;

pub use error::{EstimateError, VolumeError};
pub use estimator::{
    clamp, Estimate, EstimatorPolicy, InputWeight, ResourceEstimator, DEFAULT_MAX_GB,
    DEFAULT_MIN_GB, DEFAULT_OVERHEAD_GB, TRAIL_SEPARATOR,
};
pub use value::{InputSource, InputValue, Inputs};
pub use volume::{HeaderVolumeReader, VolumeReader, VolumeShape};
