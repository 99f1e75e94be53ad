use rasterlab_image::{Image, ImageDtype, ImageError};

/// The fixed denominator of [`distortion`].
///
/// It does not depend on the image size, so scores are only comparable between images
/// of equal size. Reference scores were produced with this exact value.
pub const DISTORTION_NORMALIZATION: f64 = 128.0 * 128.0;

/// Compute the distortion between two images.
///
/// The distortion is defined as:
///
/// $ D(a, b) = \frac{1}{128^2} \sum_{i=1}^{N} |a_i - b_i| $
///
/// where `a` and `b` are the two images and `N` is the number of samples. The score is
/// zero for identical images, symmetric and unbounded above.
///
/// # Arguments
///
/// * `image1` - The first input image with shape (H, W, C).
/// * `image2` - The second input image with shape (H, W, C).
///
/// # Returns
///
/// The distortion between the two images.
///
/// # Errors
///
/// [`ImageError::InvalidImageSize`] if the images have different sizes.
///
/// # Example
///
/// ```
/// use rasterlab_image::Image;
/// use rasterlab_imgproc::metrics::distortion;
///
/// let image1 = Image::<u8, 1>::new([2, 1].into(), vec![0, 255]).unwrap();
/// let image2 = Image::<u8, 1>::new([2, 1].into(), vec![128, 127]).unwrap();
///
/// assert_eq!(distortion(&image1, &image2).unwrap(), 256.0 / 16384.0);
/// ```
pub fn distortion<T: ImageDtype, const C: usize>(
    image1: &Image<T, C>,
    image2: &Image<T, C>,
) -> Result<f64, ImageError> {
    if image1.size() != image2.size() {
        return Err(ImageError::InvalidImageSize(
            image1.width(),
            image1.height(),
            image2.width(),
            image2.height(),
        ));
    }

    let total = image1
        .as_slice()
        .iter()
        .zip(image2.as_slice().iter())
        .fold(0f64, |acc, (&a, &b)| {
            let (a, b): (f32, f32) = (a.into(), b.into());
            acc + (a as f64 - b as f64).abs()
        });

    Ok(total / DISTORTION_NORMALIZATION)
}
