//! Morphological image processing operations.

/// Kernel (structuring element) utilities.
mod kernel;
pub use kernel::{Kernel, KernelShape};

/// Dilation, erosion, opening and closing.
mod ops;
pub use ops::{close, dilate, erode, open};
