//! Parameter checks shared by the noise generators and the filter bank.
//!
//! Parameters are rejected, never clamped.

use rasterlab_image::{ImageError, ImageSize};

/// Upper bound on the number of cells of a square window or kernel.
pub(crate) const MAX_WINDOW_AREA: usize = 1 << 24;

/// Window and kernel sizes must be odd and at least one.
pub(crate) fn check_odd_size(size: usize) -> Result<(), ImageError> {
    if size == 0 || size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(size));
    }
    Ok(())
}

/// Odd window sizes whose area stays below [`MAX_WINDOW_AREA`]. Returns the area.
pub(crate) fn check_window_area(size: usize) -> Result<usize, ImageError> {
    check_odd_size(size)?;
    match size.checked_mul(size) {
        Some(area) if area <= MAX_WINDOW_AREA => Ok(area),
        _ => Err(ImageError::InvalidKernelSize(size)),
    }
}

/// Windows wider than twice the image already cover it from every pixel.
pub(crate) fn check_window_fits(size: usize, image: ImageSize) -> Result<usize, ImageError> {
    let area = check_window_area(size)?;
    let limit = 2 * image.width.max(image.height) + 1;
    if size > limit {
        return Err(ImageError::InvalidKernelSize(size));
    }
    Ok(area)
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), ImageError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ImageError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        });
    }
    Ok(())
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), ImageError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ImageError::InvalidParameter {
            name,
            value,
            reason: "must be finite and positive",
        });
    }
    Ok(())
}

pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ImageError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ImageError::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        });
    }
    Ok(())
}
