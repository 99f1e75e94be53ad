use rasterlab_image::{Image, ImageDtype, ImageError};

use crate::params::{check_non_negative, check_odd_size};

/// Apply the sigma filter to an image.
///
/// The sigma filter is an edge preserving smoothing filter. For every channel and every
/// pixel whose full window fits inside the image, the output is the mean of the window
/// samples `v` satisfying `|v - center| <= sigma`. The center always qualifies, so flat
/// regions are averaged while samples across an edge are left out of the mean.
///
/// Pixels closer than `window_size / 2` to any border are copied unchanged.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `window_size` - The side of the square window. Must be odd.
/// * `sigma` - The inclusive tolerance, in sample units. Must be non-negative.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
///
/// # Errors
///
/// [`ImageError::InvalidKernelSize`] for an even or zero `window_size` and
/// [`ImageError::InvalidParameter`] for a negative or non finite `sigma`.
///
/// # Example
///
/// ```
/// use rasterlab_image::Image;
/// use rasterlab_imgproc::filter::sigma_filter;
///
/// #[rustfmt::skip]
/// let image = Image::<u8, 1>::new(
///     [3, 3].into(),
///     vec![
///         10, 12, 200,
///         14, 11, 205,
///         13, 10, 210,
///     ],
/// ).unwrap();
///
/// let filtered = sigma_filter(&image, 3, 5.0).unwrap();
///
/// // the bright column is out of tolerance of the center
/// assert_eq!(filtered.get(1, 1, 0).unwrap(), 12);
/// ```
pub fn sigma_filter<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    window_size: usize,
    sigma: f32,
) -> Result<Image<T, C>, ImageError> {
    check_odd_size(window_size)?;
    check_non_negative("sigma", sigma as f64)?;

    let half = window_size / 2;
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();

    Image::from_fn(src.size(), |row, col, ch| {
        let center = data[(row * width + col) * C + ch];

        if row < half || col < half || row + half >= height || col + half >= width {
            return center;
        }

        let center_val: f32 = center.into();
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for r in row - half..=row + half {
            for c in col - half..=col + half {
                let val: f32 = data[(r * width + c) * C + ch].into();
                if (val - center_val).abs() <= sigma {
                    sum += val;
                    count += 1;
                }
            }
        }

        if count == 0 {
            return center;
        }

        T::from_f32(sum / count as f32)
    })
}
