//! Noise and filter benchmarking
//!
//! The [`BenchmarkDriver`] degrades a pristine image with every configured
//! [`NoiseModel`], runs every filter of its bank on the degraded image and scores each
//! output against the pristine image with [`distortion`].
//!
//! # Example
//!
//! ```
//! use rasterlab_image::Image;
//! use rasterlab_imgproc::benchmark::{BenchmarkDriver, FilterSpec};
//! use rasterlab_imgproc::noise::NoiseModel;
//!
//! let image = Image::<u8, 3>::from_fn([16, 16].into(), |r, c, _| (r * 16 + c) as u8).unwrap();
//!
//! let result = BenchmarkDriver::new(42)
//!     .with_noise_model(NoiseModel::AdditiveGaussian { variance: 20.0 })
//!     .with_filter(FilterSpec::Median { window_size: 3 })
//!     .with_filter(FilterSpec::Sigma { window_size: 3, sigma: 20.0 })
//!     .run(&image);
//!
//! assert_eq!(result.len(), 2);
//! ```

use rand::{rngs::StdRng, SeedableRng};
use rasterlab_image::{Image, ImageDtype, ImageError};
use serde::{Deserialize, Serialize};

use crate::filter;
use crate::metrics::distortion;
use crate::morphology::{self, Kernel, KernelShape};
use crate::noise::{add_noise, default_noise_suite, NoiseModel};
use crate::parallel::{map_indexed, ExecutionStrategy};

/// A filter of the benchmark bank with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// [`filter::sigma_filter`]
    Sigma {
        /// Side of the square window.
        window_size: usize,
        /// Inclusive tolerance around the center sample.
        sigma: f32,
    },
    /// [`filter::mean_filter`]
    Mean {
        /// Side of the square window.
        window_size: usize,
    },
    /// [`filter::gaussian_blur`]
    Gaussian {
        /// Side of the square kernel.
        kernel_size: usize,
        /// Standard deviation, zero to derive it from the kernel size.
        sigma: f32,
    },
    /// [`filter::median_filter`]
    Median {
        /// Side of the square window.
        window_size: usize,
    },
    /// [`filter::bilateral_filter`]
    Bilateral {
        /// Diameter of the neighborhood.
        diameter: usize,
        /// Range sigma.
        sigma_color: f32,
        /// Spatial sigma.
        sigma_space: f32,
    },
    /// [`morphology::dilate`]
    Dilate {
        /// Structuring element.
        kernel: KernelShape,
    },
    /// [`morphology::erode`]
    Erode {
        /// Structuring element.
        kernel: KernelShape,
    },
    /// [`morphology::open`]
    Open {
        /// Structuring element.
        kernel: KernelShape,
    },
    /// [`morphology::close`]
    Close {
        /// Structuring element.
        kernel: KernelShape,
    },
}

impl FilterSpec {
    /// Run the filter on an image.
    ///
    /// # Errors
    ///
    /// The error of the underlying filter, typically an invalid parameter.
    pub fn filter<T: ImageDtype, const C: usize>(
        &self,
        src: &Image<T, C>,
    ) -> Result<Image<T, C>, ImageError> {
        match *self {
            FilterSpec::Sigma { window_size, sigma } => {
                filter::sigma_filter(src, window_size, sigma)
            }
            FilterSpec::Mean { window_size } => filter::mean_filter(src, window_size),
            FilterSpec::Gaussian { kernel_size, sigma } => {
                filter::gaussian_blur(src, kernel_size, sigma)
            }
            FilterSpec::Median { window_size } => filter::median_filter(src, window_size),
            FilterSpec::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => filter::bilateral_filter(src, diameter, sigma_color, sigma_space),
            FilterSpec::Dilate { kernel } => morphology::dilate(src, &Kernel::new(kernel)?),
            FilterSpec::Erode { kernel } => morphology::erode(src, &Kernel::new(kernel)?),
            FilterSpec::Open { kernel } => morphology::open(src, &Kernel::new(kernel)?),
            FilterSpec::Close { kernel } => morphology::close(src, &Kernel::new(kernel)?),
        }
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FilterSpec::Sigma { window_size, sigma } => {
                write!(f, "sigma({window_size}x{window_size}, sigma={sigma})")
            }
            FilterSpec::Mean { window_size } => write!(f, "mean({window_size}x{window_size})"),
            FilterSpec::Gaussian { kernel_size, sigma } if *sigma == 0.0 => {
                write!(f, "gaussian({kernel_size}x{kernel_size}, sigma=auto)")
            }
            FilterSpec::Gaussian { kernel_size, sigma } => {
                write!(f, "gaussian({kernel_size}x{kernel_size}, sigma={sigma})")
            }
            FilterSpec::Median { window_size } => {
                write!(f, "median({window_size}x{window_size})")
            }
            FilterSpec::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => write!(
                f,
                "bilateral(d={diameter}, sigma_color={sigma_color}, sigma_space={sigma_space})"
            ),
            FilterSpec::Dilate { kernel } => write!(f, "dilate({kernel})"),
            FilterSpec::Erode { kernel } => write!(f, "erode({kernel})"),
            FilterSpec::Open { kernel } => write!(f, "open({kernel})"),
            FilterSpec::Close { kernel } => write!(f, "close({kernel})"),
        }
    }
}

/// The filter bank of the reference experiments, with the sigma filter appended.
pub fn default_filter_bank() -> Vec<FilterSpec> {
    let box5 = KernelShape::Box { size: 5 };
    vec![
        FilterSpec::Mean { window_size: 3 },
        FilterSpec::Gaussian {
            kernel_size: 9,
            sigma: 1.0,
        },
        FilterSpec::Median { window_size: 3 },
        FilterSpec::Bilateral {
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
        },
        FilterSpec::Gaussian {
            kernel_size: 5,
            sigma: 0.0,
        },
        FilterSpec::Open { kernel: box5 },
        FilterSpec::Close { kernel: box5 },
        FilterSpec::Dilate { kernel: box5 },
        FilterSpec::Erode { kernel: box5 },
        FilterSpec::Sigma {
            window_size: 3,
            sigma: 20.0,
        },
    ]
}

/// A transform that can be plugged into the benchmark bank.
pub trait ImageFilter<const C: usize>: Send + Sync {
    /// A human readable name, used to label the results.
    fn name(&self) -> String;

    /// Filter an image, returning a new image of the same size.
    fn apply(&self, src: &Image<u8, C>) -> Result<Image<u8, C>, ImageError>;
}

impl<const C: usize> ImageFilter<C> for FilterSpec {
    fn name(&self) -> String {
        self.to_string()
    }

    fn apply(&self, src: &Image<u8, C>) -> Result<Image<u8, C>, ImageError> {
        self.filter(src)
    }
}

/// The stages the driver goes through for every noise model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkStage {
    /// Nothing is running.
    Idle,
    /// Drawing the degraded image.
    Generating,
    /// Running the filter bank on the degraded image.
    Filtering,
    /// Comparing a filtered image with the pristine one.
    Scoring,
    /// Handing the results to the reporter.
    Reporting,
}

/// The score of one (noise model, filter) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    /// Position of the noise model in the driver.
    pub noise_index: usize,
    /// The noise model.
    pub noise: NoiseModel,
    /// Position of the filter in the bank.
    pub filter_index: usize,
    /// The filter name.
    pub filter: String,
    /// The distortion against the pristine image, or why it could not be computed.
    pub score: Result<f64, String>,
}

/// The scores of a benchmark run, noise model major, in the order of the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BenchmarkResult {
    entries: Vec<BenchmarkEntry>,
}

impl BenchmarkResult {
    /// All the entries in insertion order.
    pub fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, BenchmarkEntry> {
        self.entries.iter()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry of a (noise model, filter) pair.
    pub fn get(&self, noise_index: usize, filter_index: usize) -> Option<&BenchmarkEntry> {
        self.entries
            .iter()
            .find(|e| e.noise_index == noise_index && e.filter_index == filter_index)
    }

    /// The entries of a single noise model.
    pub fn for_noise(&self, noise_index: usize) -> impl Iterator<Item = &BenchmarkEntry> {
        self.entries
            .iter()
            .filter(move |e| e.noise_index == noise_index)
    }

    /// The entries whose score could not be computed.
    pub fn failures(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        self.entries.iter().filter(|e| e.score.is_err())
    }
}

impl<'a> IntoIterator for &'a BenchmarkResult {
    type Item = &'a BenchmarkEntry;
    type IntoIter = std::slice::Iter<'a, BenchmarkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Consumer of finished benchmark results, e.g. a console table or a file writer.
pub trait BenchmarkReporter {
    /// The error the reporter can fail with.
    type Error;

    /// Present the results.
    fn report(&mut self, result: &BenchmarkResult) -> Result<(), Self::Error>;
}

/// Parameters of a benchmark run, e.g. loaded from a JSON suite file.
///
/// Missing fields take their default: seed zero, the default noise suite, the default
/// filter bank and serial execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Seed of the noise generators.
    pub seed: u64,
    /// Noise models, in run order.
    pub noise_models: Vec<NoiseModel>,
    /// Filter bank, in run order.
    pub filters: Vec<FilterSpec>,
    /// How the work is scheduled.
    pub strategy: ExecutionStrategy,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            noise_models: default_noise_suite(),
            filters: default_filter_bank(),
            strategy: ExecutionStrategy::default(),
        }
    }
}

/// Runs a filter bank against a set of noise models.
///
/// The noise of model `i` is drawn from a [`StdRng`] seeded with `seed + i`, so a run is
/// reproducible and independent of the [`ExecutionStrategy`].
pub struct BenchmarkDriver<const C: usize> {
    seed: u64,
    noise_models: Vec<NoiseModel>,
    filters: Vec<Box<dyn ImageFilter<C>>>,
    strategy: ExecutionStrategy,
}

impl<const C: usize> Default for BenchmarkDriver<C> {
    /// A driver with seed zero, the default noise suite and the default filter bank.
    fn default() -> Self {
        Self::from_config(BenchmarkConfig::default())
    }
}

impl<const C: usize> From<BenchmarkConfig> for BenchmarkDriver<C> {
    fn from(config: BenchmarkConfig) -> Self {
        Self::from_config(config)
    }
}

impl<const C: usize> BenchmarkDriver<C> {
    /// Create a driver with no noise model and an empty bank.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            noise_models: Vec::new(),
            filters: Vec::new(),
            strategy: ExecutionStrategy::default(),
        }
    }

    /// Create a driver from a [`BenchmarkConfig`].
    pub fn from_config(config: BenchmarkConfig) -> Self {
        Self::new(config.seed)
            .with_noise_models(config.noise_models)
            .with_filters(config.filters)
            .with_strategy(config.strategy)
    }

    /// Append a noise model.
    pub fn with_noise_model(mut self, model: NoiseModel) -> Self {
        self.noise_models.push(model);
        self
    }

    /// Append several noise models, keeping their order.
    pub fn with_noise_models(mut self, models: impl IntoIterator<Item = NoiseModel>) -> Self {
        self.noise_models.extend(models);
        self
    }

    /// Append a filter to the bank.
    pub fn with_filter(mut self, filter: impl ImageFilter<C> + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append several filters to the bank, keeping their order.
    pub fn with_filters<F>(mut self, filters: impl IntoIterator<Item = F>) -> Self
    where
        F: ImageFilter<C> + 'static,
    {
        for filter in filters {
            self.filters.push(Box::new(filter));
        }
        self
    }

    /// Set how noise models and filters are scheduled.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The seed of the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configured noise models.
    pub fn noise_models(&self) -> &[NoiseModel] {
        &self.noise_models
    }

    /// The names of the filters of the bank.
    pub fn filter_names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Draw the degraded image of a noise model, as the benchmark does.
    ///
    /// Returns `None` if `noise_index` names no configured model, and the error of
    /// [`add_noise`] if the model is invalid.
    pub fn degrade(
        &self,
        source: &Image<u8, C>,
        noise_index: usize,
    ) -> Option<Result<Image<u8, C>, ImageError>> {
        let model = self.noise_models.get(noise_index)?;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(noise_index as u64));
        Some(add_noise(source, model, &mut rng))
    }

    /// Run every (noise model, filter) pair.
    ///
    /// Failures are recorded per pair and never stop the run.
    pub fn run(&self, source: &Image<u8, C>) -> BenchmarkResult {
        let result = self.run_pairs(source);
        log::debug!("benchmark: {:?}", BenchmarkStage::Idle);
        result
    }

    /// Run the benchmark and hand the full result to a reporter.
    pub fn run_and_report<R: BenchmarkReporter>(
        &self,
        source: &Image<u8, C>,
        reporter: &mut R,
    ) -> Result<BenchmarkResult, R::Error> {
        let result = self.run_pairs(source);
        log::debug!("benchmark: {:?}", BenchmarkStage::Reporting);
        let reported = reporter.report(&result);
        log::debug!("benchmark: {:?}", BenchmarkStage::Idle);
        reported.map(|_| result)
    }

    fn run_pairs(&self, source: &Image<u8, C>) -> BenchmarkResult {
        log::debug!(
            "benchmark {}x{}: {} noise models, {} filters, {:?}",
            source.width(),
            source.height(),
            self.noise_models.len(),
            self.filters.len(),
            self.strategy
        );

        let per_model = map_indexed(self.strategy, &self.noise_models, |i, model| {
            self.run_noise_model(source, i, model)
        });

        BenchmarkResult {
            entries: per_model.into_iter().flatten().collect(),
        }
    }

    fn run_noise_model(
        &self,
        source: &Image<u8, C>,
        noise_index: usize,
        model: &NoiseModel,
    ) -> Vec<BenchmarkEntry> {
        let entry = |filter_index: usize, filter: &dyn ImageFilter<C>, score| BenchmarkEntry {
            noise_index,
            noise: *model,
            filter_index,
            filter: filter.name(),
            score,
        };

        log::debug!("[{noise_index}] {model}: {:?}", BenchmarkStage::Generating);
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(noise_index as u64));
        let degraded = match add_noise(source, model, &mut rng) {
            Ok(degraded) => degraded,
            Err(err) => {
                log::warn!("[{noise_index}] {model}: noise generation failed: {err}");
                return self
                    .filters
                    .iter()
                    .enumerate()
                    .map(|(fi, f)| entry(fi, f.as_ref(), Err(format!("noise: {err}"))))
                    .collect();
            }
        };

        log::debug!("[{noise_index}] {model}: {:?}", BenchmarkStage::Filtering);
        map_indexed(self.strategy, &self.filters, |fi, f| {
            let score = f.apply(&degraded).and_then(|filtered| {
                log::debug!(
                    "[{noise_index}] {model} / {}: {:?}",
                    f.name(),
                    BenchmarkStage::Scoring
                );
                distortion(source, &filtered)
            });
            let score = score.map_err(|err| {
                log::warn!("[{noise_index}] {model} / {}: {err}", f.name());
                err.to_string()
            });
            entry(fi, f.as_ref(), score)
        })
    }
}
