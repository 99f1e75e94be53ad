use rasterlab_image::ImageError;
use serde::{Deserialize, Serialize};

use crate::params::check_window_area;

/// Shapes of morphological `Kernels`.
///
/// Defines the geometry of the kernel used in morphological operations.
/// All kernels are centered at their geometric center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum KernelShape {
    /// A rectangular box structuring element.
    ///
    /// All pixels within the box are included in the morphological operation.
    Box {
        /// The side length of the square kernel (size x size).
        size: usize,
    },

    /// A cross (plus) shaped structuring element.
    ///
    /// Only pixels along the horizontal and vertical center lines are included,
    /// forming a plus/cross pattern.
    Cross {
        /// The side length of the square cross kernel (size x size).
        size: usize,
    },
}

impl std::fmt::Display for KernelShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            KernelShape::Box { size } => write!(f, "box{size}x{size}"),
            KernelShape::Cross { size } => write!(f, "cross{size}x{size}"),
        }
    }
}

/// A morphological structuring element.
///
/// The kernel stores a binary mask where 1 marks the pixels included in the operation.
///
/// # Example
///
/// ```rust
/// use rasterlab_imgproc::morphology::{Kernel, KernelShape};
///
/// // Create a 3x3 box kernel
/// let kernel = Kernel::new(KernelShape::Box { size: 3 }).unwrap();
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.height(), 3);
/// assert_eq!(kernel.pad(), (1, 1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Kernel {
    /// Create a morphological kernel from a shape.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidKernelSize`] if the size is even or zero, or if the kernel
    /// would have more than 2^24 cells.
    pub fn new(shape: KernelShape) -> Result<Self, ImageError> {
        match shape {
            KernelShape::Box { size } => {
                let area = check_window_area(size)?;
                Ok(Self {
                    data: vec![1; area],
                    width: size,
                    height: size,
                })
            }
            KernelShape::Cross { size } => {
                let area = check_window_area(size)?;
                let mid = size / 2;
                let data = (0..area)
                    .map(|i| u8::from(i / size == mid || i % size == mid))
                    .collect();
                Ok(Self {
                    data,
                    width: size,
                    height: size,
                })
            }
        }
    }

    /// The binary mask, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The kernel width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The kernel height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The half sizes `(pad_h, pad_w)` of the kernel.
    pub fn pad(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    /// Offsets `(ky, kx)` of the active cells, relative to the top-left of the kernel.
    pub(crate) fn active_cells(&self) -> Vec<(usize, usize)> {
        (0..self.height)
            .flat_map(|ky| (0..self.width).map(move |kx| (ky, kx)))
            .filter(|&(ky, kx)| self.data[ky * self.width + kx] == 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_kernel() -> Result<(), ImageError> {
        let kernel = Kernel::new(KernelShape::Box { size: 3 })?;
        assert_eq!(kernel.data(), &[1; 9]);
        assert_eq!(kernel.active_cells().len(), 9);
        Ok(())
    }

    #[test]
    fn test_cross_kernel() -> Result<(), ImageError> {
        let kernel = Kernel::new(KernelShape::Cross { size: 3 })?;
        #[rustfmt::skip]
        assert_eq!(kernel.data(), &[
            0, 1, 0,
            1, 1, 1,
            0, 1, 0,
        ]);
        assert_eq!(kernel.pad(), (1, 1));
        Ok(())
    }

    #[test]
    fn test_even_kernel() {
        assert_eq!(
            Kernel::new(KernelShape::Box { size: 4 }),
            Err(ImageError::InvalidKernelSize(4))
        );
    }

    #[test]
    fn test_oversized_kernel() {
        let huge = (1usize << 32) + 1;
        assert_eq!(
            Kernel::new(KernelShape::Box { size: huge }),
            Err(ImageError::InvalidKernelSize(huge))
        );
        assert_eq!(
            Kernel::new(KernelShape::Cross { size: 100_001 }),
            Err(ImageError::InvalidKernelSize(100_001))
        );
    }
}
