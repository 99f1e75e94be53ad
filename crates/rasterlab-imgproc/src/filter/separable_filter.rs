use rasterlab_image::{Image, ImageDtype, ImageError};

use super::replicate_index;
use crate::params::check_odd_size;

/// Apply a separable filter to an image.
///
/// The horizontal kernel is applied first, then the vertical one. Samples outside the
/// image replicate the nearest border sample.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel, of odd length.
/// * `kernel_y` - The vertical kernel, of odd length.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
pub fn separable_filter<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<Image<T, C>, ImageError> {
    check_odd_size(kernel_x.len())?;
    check_odd_size(kernel_y.len())?;

    let (width, height) = (src.width(), src.height());
    let src_data = src.as_slice();

    // apply the horizontal filter
    let half_x = kernel_x.len() / 2;
    let mut temp = vec![0.0f32; src.numel()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..C {
                let mut sum = 0.0;
                for (k, &w) in kernel_x.iter().enumerate() {
                    let x_pos = replicate_index(x, k, half_x, width);
                    let val: f32 = src_data[(y * width + x_pos) * C + c].into();
                    sum += val * w;
                }
                temp[(y * width + x) * C + c] = sum;
            }
        }
    }

    // apply the vertical filter
    let half_y = kernel_y.len() / 2;
    Image::from_fn(src.size(), |y, x, c| {
        let sum = kernel_y.iter().enumerate().fold(0.0f32, |acc, (k, &w)| {
            let y_pos = replicate_index(y, k, half_y, height);
            acc + temp[(y_pos * width + x) * C + c] * w
        });
        T::from_f32(sum)
    })
}
