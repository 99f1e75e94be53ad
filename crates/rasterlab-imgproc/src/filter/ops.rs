use rasterlab_image::{Image, ImageDtype, ImageError};

use super::{kernels, replicate_index, separable_filter};
use crate::params::{check_non_negative, check_positive, check_window_fits};

/// Blur an image with the windowed arithmetic mean.
///
/// Samples outside the image replicate the nearest border sample.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `window_size` - The side of the square window. Must be odd and at most
///   `2 * max(width, height) + 1`.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
pub fn mean_filter<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    window_size: usize,
) -> Result<Image<T, C>, ImageError> {
    let area = check_window_fits(window_size, src.size())?;

    let half = window_size / 2;
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();
    let norm = area as f32;

    Image::from_fn(src.size(), |row, col, ch| {
        let mut sum = 0.0f32;
        for ky in 0..window_size {
            let r = replicate_index(row, ky, half, height);
            for kx in 0..window_size {
                let c = replicate_index(col, kx, half, width);
                let val: f32 = data[(r * width + c) * C + ch].into();
                sum += val;
            }
        }
        T::from_f32(sum / norm)
    })
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel_size` - The size of the square kernel. Must be odd and at most
///   `2 * max(width, height) + 1`.
/// * `sigma` - The sigma of the gaussian kernel. Zero derives it from the kernel size.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
pub fn gaussian_blur<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    kernel_size: usize,
    sigma: f32,
) -> Result<Image<T, C>, ImageError> {
    check_window_fits(kernel_size, src.size())?;
    check_non_negative("sigma", sigma as f64)?;

    let sigma = if sigma == 0.0 {
        kernels::gaussian_sigma_from_size(kernel_size)
    } else {
        sigma
    };

    let kernel = kernels::gaussian_kernel_1d(kernel_size, sigma);
    separable_filter(src, &kernel, &kernel)
}

/// Replace every sample by the median of its window.
///
/// Channels are filtered independently. Samples outside the image replicate the
/// nearest border sample.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `window_size` - The side of the square window. Must be odd and at most
///   `2 * max(width, height) + 1`.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
pub fn median_filter<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    window_size: usize,
) -> Result<Image<T, C>, ImageError> {
    let area = check_window_fits(window_size, src.size())?;

    let half = window_size / 2;
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();
    let mut window = Vec::with_capacity(area);

    Image::from_fn(src.size(), |row, col, ch| {
        window.clear();
        for ky in 0..window_size {
            let r = replicate_index(row, ky, half, height);
            for kx in 0..window_size {
                let c = replicate_index(col, kx, half, width);
                window.push(data[(r * width + c) * C + ch]);
            }
        }
        // the window has an odd number of samples
        let mid = window.len() / 2;
        let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| {
            let (a, b): (f32, f32) = ((*a).into(), (*b).into());
            a.total_cmp(&b)
        });
        *median
    })
}

/// Apply a bilateral filter to an image.
///
/// Each pixel becomes the weighted mean of the pixels of a disc of radius
/// `diameter / 2` around it. The weight of a neighbor is the product of a spatial
/// gaussian on its distance and a range gaussian on its color distance, the sum of the
/// absolute channel differences. Samples outside the image replicate the nearest
/// border sample.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `diameter` - The diameter of the neighborhood. Must be odd and at most
///   `2 * max(width, height) + 1`.
/// * `sigma_color` - The sigma of the range gaussian, in sample units.
/// * `sigma_space` - The sigma of the spatial gaussian, in pixels.
///
/// # Returns
///
/// The filtered image with the shape of `src`.
pub fn bilateral_filter<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<Image<T, C>, ImageError> {
    let area = check_window_fits(diameter, src.size())?;
    check_positive("sigma_color", sigma_color as f64)?;
    check_positive("sigma_space", sigma_space as f64)?;

    let radius = diameter / 2;
    let (width, height) = (src.width(), src.height());
    let data = src.as_slice();

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // window taps inside the disc with their spatial weight
    let mut taps = Vec::with_capacity(area);
    for ky in 0..diameter {
        for kx in 0..diameter {
            let dy = ky as f32 - radius as f32;
            let dx = kx as f32 - radius as f32;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= (radius * radius) as f32 {
                taps.push((ky, kx, (dist_sq * space_coeff).exp()));
            }
        }
    }

    let mut out = Vec::with_capacity(src.numel());
    for row in 0..height {
        for col in 0..width {
            let center = &data[(row * width + col) * C..][..C];
            let mut sum = [0.0f32; C];
            let mut norm = 0.0f32;

            for &(ky, kx, space_weight) in &taps {
                let r = replicate_index(row, ky, radius, height);
                let c = replicate_index(col, kx, radius, width);
                let neighbor = &data[(r * width + c) * C..][..C];

                let color_dist = neighbor
                    .iter()
                    .zip(center.iter())
                    .map(|(&n, &m)| {
                        let (n, m): (f32, f32) = (n.into(), m.into());
                        (n - m).abs()
                    })
                    .sum::<f32>();
                let weight = space_weight * (color_dist * color_dist * color_coeff).exp();

                for (acc, &n) in sum.iter_mut().zip(neighbor.iter()) {
                    let n: f32 = n.into();
                    *acc += weight * n;
                }
                norm += weight;
            }

            // the center tap has weight one, so norm is never zero
            out.extend(sum.iter().map(|&s| T::from_f32(s / norm)));
        }
    }

    Image::new(src.size(), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterlab_image::ImageSize;

    fn ramp(size: ImageSize) -> Result<Image<f32, 1>, ImageError> {
        Image::from_fn(size, |row, col, _| (row * size.width + col) as f32)
    }

    #[test]
    fn test_mean_filter() -> Result<(), ImageError> {
        let img = ramp([5, 5].into())?;
        let dst = mean_filter(&img, 3)?;

        // linear ramp: interior means are the center value
        for row in 1..4 {
            for col in 1..4 {
                approx::assert_relative_eq!(
                    dst.get(row, col, 0)?,
                    img.get(row, col, 0)?,
                    epsilon = 1e-5
                );
            }
        }
        // replicated corner: (0 + 0 + 1 + 0 + 0 + 1 + 5 + 5 + 6) / 9
        approx::assert_relative_eq!(dst.get(0, 0, 0)?, 2.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn test_gaussian_blur() -> Result<(), ImageError> {
        let flat = Image::<u8, 3>::from_size_val([7, 6].into(), 77)?;
        assert_eq!(gaussian_blur(&flat, 5, 1.0)?, flat);
        assert_eq!(gaussian_blur(&flat, 5, 0.0)?, flat);

        #[rustfmt::skip]
        let img = Image::<f32, 1>::new(
            [3, 3].into(),
            vec![
                0.0, 0.0, 0.0,
                0.0, 1.0, 0.0,
                0.0, 0.0, 0.0,
            ],
        )?;
        let dst = gaussian_blur(&img, 3, 0.5)?;
        let k = kernels::gaussian_kernel_1d(3, 0.5);
        approx::assert_relative_eq!(dst.get(1, 1, 0)?, k[1] * k[1], epsilon = 1e-6);
        approx::assert_relative_eq!(dst.get(0, 1, 0)?, k[0] * k[1], epsilon = 1e-6);

        let total: f32 = dst.as_slice().iter().sum();
        assert!(total < 1.0 + 1e-5);
        Ok(())
    }

    #[test]
    fn test_median_filter_removes_impulse() -> Result<(), ImageError> {
        let img = Image::<u8, 3>::from_fn([5, 5].into(), |row, col, _| {
            if (row, col) == (2, 2) {
                255
            } else {
                40
            }
        })?;
        let dst = median_filter(&img, 3)?;
        assert!(dst.as_slice().iter().all(|&v| v == 40));
        Ok(())
    }

    #[test]
    fn test_median_filter_values() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let img = Image::<u8, 1>::new(
            [3, 3].into(),
            vec![
                9, 1, 8,
                2, 7, 3,
                6, 4, 5,
            ],
        )?;
        let dst = median_filter(&img, 3)?;
        assert_eq!(dst.get(1, 1, 0)?, 5);
        // replicated corner window: 9 9 1 / 9 9 1 / 2 2 7
        assert_eq!(dst.get(0, 0, 0)?, 7);
        Ok(())
    }

    #[test]
    fn test_bilateral_filter_preserves_edges() -> Result<(), ImageError> {
        let img = Image::<u8, 3>::from_fn([10, 10].into(), |_, col, _| {
            if col < 5 {
                20
            } else {
                220
            }
        })?;
        let dst = bilateral_filter(&img, 5, 10.0, 5.0)?;
        assert_eq!(dst, img);

        // a wide range gaussian mixes both sides at the edge
        let blurred = bilateral_filter(&img, 5, 10_000.0, 5.0)?;
        let left = blurred.get(5, 4, 0)?;
        assert!(left > 20 && left < 220, "left {left}");
        Ok(())
    }

    #[test]
    fn test_filters_keep_size() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 4,
        };
        let img = Image::<u8, 3>::from_fn(size, |r, c, ch| (r * 31 + c * 17 + ch * 5) as u8)?;

        assert_eq!(mean_filter(&img, 5)?.size(), size);
        assert_eq!(gaussian_blur(&img, 9, 1.0)?.size(), size);
        assert_eq!(median_filter(&img, 7)?.size(), size);
        assert_eq!(bilateral_filter(&img, 9, 75.0, 75.0)?.size(), size);
        Ok(())
    }

    #[test]
    fn test_filters_reject_bad_parameters() -> Result<(), ImageError> {
        let img = Image::<u8, 3>::from_size_val([4, 4].into(), 0)?;

        assert_eq!(mean_filter(&img, 2), Err(ImageError::InvalidKernelSize(2)));
        assert_eq!(mean_filter(&img, 11), Err(ImageError::InvalidKernelSize(11)));
        let huge = (1usize << 32) + 1;
        assert_eq!(median_filter(&img, huge), Err(ImageError::InvalidKernelSize(huge)));
        assert_eq!(
            bilateral_filter(&img, huge, 75.0, 75.0),
            Err(ImageError::InvalidKernelSize(huge))
        );
        assert_eq!(
            gaussian_blur(&img, usize::MAX, 1.0),
            Err(ImageError::InvalidKernelSize(usize::MAX))
        );
        assert_eq!(median_filter(&img, 0), Err(ImageError::InvalidKernelSize(0)));
        assert!(matches!(
            gaussian_blur(&img, 3, -1.0),
            Err(ImageError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            bilateral_filter(&img, 9, 0.0, 75.0),
            Err(ImageError::InvalidParameter {
                name: "sigma_color",
                ..
            })
        ));
        Ok(())
    }
}
