//! Filter operations
//!
//! Denoising filters of the benchmark bank. Every filter is a pure function from an
//! image to a new image of the same size.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

/// Adaptive sigma filter
mod sigma;
pub use sigma::sigma_filter;

/// Replicate-border index of the `k`-th tap of a window of half size `half` centered
/// at `idx`, for an axis of length `len`.
#[inline]
pub(crate) fn replicate_index(idx: usize, k: usize, half: usize, len: usize) -> usize {
    (idx + k).saturating_sub(half).min(len - 1)
}
