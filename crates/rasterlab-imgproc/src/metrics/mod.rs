//! Image distortion metrics.
//!
//! Scalar measures of how far a processed image is from a reference one, used to
//! score denoising filters against the pristine image.
//!
//! # Available Metrics
//!
//! - **Distortion**: sum of absolute sample differences scaled by a fixed `128 * 128`

mod distortion;

pub use distortion::{distortion, DISTORTION_NORMALIZATION};
