#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// noise synthesis module.
pub mod noise;

/// image filtering module.
pub mod filter;

/// morphological operations module.
pub mod morphology;

/// image distortion metrics module.
pub mod metrics;

/// module containing parallization utilities.
pub mod parallel;

/// noise/filter benchmarking module.
pub mod benchmark;

mod params;
