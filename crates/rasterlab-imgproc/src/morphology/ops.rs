use rasterlab_image::{Image, ImageDtype, ImageError};

use super::Kernel;
use crate::params::check_window_fits;

/// Dilate an image using a [`Kernel`].
///
/// Dilation expands bright regions in the image. Each sample is replaced by the
/// maximum value in the neighborhood defined by the kernel. Kernel cells falling
/// outside the image are ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
///
/// # Returns
///
/// The dilated image with the shape of `src`.
pub fn dilate<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel: &Kernel,
) -> Result<Image<T, C>, ImageError> {
    rank_extremum(src, kernel, f32::max)
}

/// Erode an image using a [`Kernel`].
///
/// Erosion shrinks bright regions in the image. Each sample is replaced by the
/// minimum value in the neighborhood defined by the kernel. Kernel cells falling
/// outside the image are ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
///
/// # Returns
///
/// The eroded image with the shape of `src`.
pub fn erode<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel: &Kernel,
) -> Result<Image<T, C>, ImageError> {
    rank_extremum(src, kernel, f32::min)
}

/// Morphological opening: an erosion followed by a dilation.
///
/// Removes bright details smaller than the kernel.
pub fn open<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel: &Kernel,
) -> Result<Image<T, C>, ImageError> {
    dilate(&erode(src, kernel)?, kernel)
}

/// Morphological closing: a dilation followed by an erosion.
///
/// Removes dark details smaller than the kernel.
pub fn close<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel: &Kernel,
) -> Result<Image<T, C>, ImageError> {
    erode(&dilate(src, kernel)?, kernel)
}

fn rank_extremum<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel: &Kernel,
    pick: fn(f32, f32) -> f32,
) -> Result<Image<T, C>, ImageError> {
    check_window_fits(kernel.width().max(kernel.height()), src.size())?;

    let (pad_h, pad_w) = kernel.pad();
    let cells = kernel.active_cells();
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();

    Image::from_fn(src.size(), |row, col, ch| {
        let center = data[(row * width + col) * C + ch];
        let mut acc: f32 = center.into();
        for &(ky, kx) in &cells {
            let (Some(r), Some(c)) = ((row + ky).checked_sub(pad_h), (col + kx).checked_sub(pad_w))
            else {
                continue;
            };
            if r >= height || c >= width {
                continue;
            }
            acc = pick(acc, data[(r * width + c) * C + ch].into());
        }
        T::from_f32(acc)
    })
}
