//! Noise synthesis
//!
//! Stochastic degradation models used to build noisy variants of a pristine image.
//! Every generator draws from a caller-supplied random source so that results are
//! reproducible under a fixed seed. Samples are rounded to the nearest integer and
//! saturated to [0, 255]; the output always has the size of the input.

use rand::Rng;
use rand_distr::StandardNormal;
use rasterlab_image::{Image, ImageError};
use serde::{Deserialize, Serialize};

use crate::params::{check_non_negative, check_unit_interval};

/// A parameterized noise process.
///
/// # Example
///
/// ```
/// use rasterlab_imgproc::noise::NoiseModel;
///
/// let model = NoiseModel::AdditiveGaussian { variance: 20.0 };
/// assert!(model.validate().is_ok());
/// assert_eq!(model.to_string(), "gaussian(variance=20)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseModel {
    /// Leave the image untouched. Used as the pristine baseline of a benchmark.
    None,

    /// Zero-mean Gaussian noise added independently to every sample.
    AdditiveGaussian {
        /// Variance of the noise, in squared sample units.
        variance: f64,
    },

    /// Salt-and-pepper noise: random pixels forced to white or black.
    Impulse {
        /// Fraction of pixels to corrupt, in [0, 1].
        amount: f64,
        /// Share of the corrupted pixels that become salt, in [0, 1].
        salt_vs_pepper: f64,
    },

    /// Gaussian noise whose variance grows with the pixel luminance.
    BrightnessDependent {
        /// Variance applied to a fully white pixel.
        base_variance: f64,
    },

    /// Gaussian noise whose variance grows towards the bottom-right corner.
    CoordinateDependent {
        /// Variance applied at the bottom-right pixel.
        base_variance: f64,
    },
}

impl NoiseModel {
    /// Check the parameters of the model.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] for negative or non finite variances and
    /// for amounts or ratios outside [0, 1].
    pub fn validate(&self) -> Result<(), ImageError> {
        match *self {
            NoiseModel::None => Ok(()),
            NoiseModel::AdditiveGaussian { variance } => check_non_negative("variance", variance),
            NoiseModel::Impulse {
                amount,
                salt_vs_pepper,
            } => {
                check_unit_interval("amount", amount)?;
                check_unit_interval("salt_vs_pepper", salt_vs_pepper)
            }
            NoiseModel::BrightnessDependent { base_variance }
            | NoiseModel::CoordinateDependent { base_variance } => {
                check_non_negative("base_variance", base_variance)
            }
        }
    }
}

impl std::fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NoiseModel::None => write!(f, "none"),
            NoiseModel::AdditiveGaussian { variance } => {
                write!(f, "gaussian(variance={variance})")
            }
            NoiseModel::Impulse {
                amount,
                salt_vs_pepper,
            } => write!(
                f,
                "impulse(amount={amount}, salt_vs_pepper={salt_vs_pepper})"
            ),
            NoiseModel::BrightnessDependent { base_variance } => {
                write!(f, "brightness(base_variance={base_variance})")
            }
            NoiseModel::CoordinateDependent { base_variance } => {
                write!(f, "coordinate(base_variance={base_variance})")
            }
        }
    }
}

/// The noise suite of the reference experiments, pristine baseline first.
pub fn default_noise_suite() -> Vec<NoiseModel> {
    vec![
        NoiseModel::None,
        NoiseModel::AdditiveGaussian { variance: 20.0 },
        NoiseModel::AdditiveGaussian { variance: 50.0 },
        NoiseModel::Impulse {
            amount: 0.05,
            salt_vs_pepper: 0.5,
        },
        NoiseModel::Impulse {
            amount: 0.1,
            salt_vs_pepper: 0.5,
        },
        NoiseModel::BrightnessDependent {
            base_variance: 30.0,
        },
        NoiseModel::BrightnessDependent {
            base_variance: 60.0,
        },
        NoiseModel::CoordinateDependent {
            base_variance: 30.0,
        },
        NoiseModel::CoordinateDependent {
            base_variance: 60.0,
        },
    ]
}

/// Degrade an image with the given noise model.
///
/// # Arguments
///
/// * `src` - The pristine image.
/// * `model` - The noise model and its parameters.
/// * `rng` - The random source to draw from.
///
/// # Returns
///
/// A new noisy image with the size of `src`.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use rasterlab_image::Image;
/// use rasterlab_imgproc::noise::{add_noise, NoiseModel};
///
/// let image = Image::<u8, 3>::from_size_val([8, 8].into(), 128).unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let noisy = add_noise(&image, &NoiseModel::AdditiveGaussian { variance: 20.0 }, &mut rng)
///     .unwrap();
/// assert_eq!(noisy.size(), image.size());
/// ```
pub fn add_noise<R, const C: usize>(
    src: &Image<u8, C>,
    model: &NoiseModel,
    rng: &mut R,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    match *model {
        NoiseModel::None => Ok(src.clone()),
        NoiseModel::AdditiveGaussian { variance } => additive_gaussian_noise(src, variance, rng),
        NoiseModel::Impulse {
            amount,
            salt_vs_pepper,
        } => impulse_noise(src, amount, salt_vs_pepper, rng),
        NoiseModel::BrightnessDependent { base_variance } => {
            brightness_dependent_noise(src, base_variance, rng)
        }
        NoiseModel::CoordinateDependent { base_variance } => {
            coordinate_dependent_noise(src, base_variance, rng)
        }
    }
}

/// Add zero-mean Gaussian noise with standard deviation `sqrt(variance)` to every sample.
///
/// A zero variance returns an image equal to the input.
pub fn additive_gaussian_noise<R, const C: usize>(
    src: &Image<u8, C>,
    variance: f64,
    rng: &mut R,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    check_non_negative("variance", variance)?;
    let std_dev = variance.sqrt();
    gaussian_perturbation(src, rng, |_, _, _| std_dev)
}

/// Add salt-and-pepper noise.
///
/// `ceil(amount * pixels * salt_vs_pepper)` pixel positions are drawn uniformly, with
/// replacement, and all their channels set to 255. Then
/// `ceil(amount * pixels * (1 - salt_vs_pepper))` positions are drawn the same way and
/// set to 0. When both sets hit a pixel, the pepper wins.
pub fn impulse_noise<R, const C: usize>(
    src: &Image<u8, C>,
    amount: f64,
    salt_vs_pepper: f64,
    rng: &mut R,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    check_unit_interval("amount", amount)?;
    check_unit_interval("salt_vs_pepper", salt_vs_pepper)?;

    let (width, height) = (src.width(), src.height());
    let num_pixels = (width * height) as f64;
    let num_salt = (amount * num_pixels * salt_vs_pepper).ceil() as usize;
    let num_pepper = (amount * num_pixels * (1.0 - salt_vs_pepper)).ceil() as usize;

    let mut overrides: Vec<Option<u8>> = vec![None; width * height];
    for (count, value) in [(num_salt, u8::MAX), (num_pepper, u8::MIN)] {
        for _ in 0..count {
            let row = rng.random_range(0..height);
            let col = rng.random_range(0..width);
            overrides[row * width + col] = Some(value);
        }
    }

    log::trace!("impulse noise: {num_salt} salt, {num_pepper} pepper draws");

    let data = src.as_slice();
    Image::from_fn(src.size(), |row, col, ch| {
        let idx = row * width + col;
        overrides[idx].unwrap_or(data[idx * C + ch])
    })
}

/// Add Gaussian noise whose variance is `base_variance` times the pixel luminance.
///
/// The luminance is the mean of the pixel channels normalized to [0, 1], so black
/// pixels are left untouched.
pub fn brightness_dependent_noise<R, const C: usize>(
    src: &Image<u8, C>,
    base_variance: f64,
    rng: &mut R,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    check_non_negative("base_variance", base_variance)?;
    gaussian_perturbation(src, rng, |_, _, pixel| {
        let luminance =
            pixel.iter().map(|&v| v as f64).sum::<f64>() / (C as f64 * u8::MAX as f64);
        (base_variance * luminance).sqrt()
    })
}

/// Add Gaussian noise whose variance is `base_variance * (x + y) / 2`.
///
/// `x` and `y` are the column and row normalized to [0, 1]; the top-left pixel is
/// left untouched. A single column (row) image uses `x = 0` (`y = 0`).
pub fn coordinate_dependent_noise<R, const C: usize>(
    src: &Image<u8, C>,
    base_variance: f64,
    rng: &mut R,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    check_non_negative("base_variance", base_variance)?;
    let normalize = |idx: usize, len: usize| {
        if len > 1 {
            idx as f64 / (len - 1) as f64
        } else {
            0.0
        }
    };
    let (width, height) = (src.width(), src.height());
    gaussian_perturbation(src, rng, |row, col, _| {
        let (x, y) = (normalize(col, width), normalize(row, height));
        (base_variance * (x + y) / 2.0).sqrt()
    })
}

/// Add `std_dev(row, col, pixel) * N(0, 1)` to every sample.
fn gaussian_perturbation<R, const C: usize>(
    src: &Image<u8, C>,
    rng: &mut R,
    std_dev: impl Fn(usize, usize, &[u8]) -> f64,
) -> Result<Image<u8, C>, ImageError>
where
    R: Rng + ?Sized,
{
    let data = src.as_slice();
    let width = src.width();
    Image::from_fn(src.size(), |row, col, ch| {
        let offset = (row * width + col) * C;
        let pixel = &data[offset..offset + C];
        let z: f64 = rng.sample(StandardNormal);
        saturate(pixel[ch] as f64 + std_dev(row, col, pixel) * z)
    })
}

fn saturate(x: f64) -> u8 {
    x.round().clamp(0.0, u8::MAX as f64) as u8
}
