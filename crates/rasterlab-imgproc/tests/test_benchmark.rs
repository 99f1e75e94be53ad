use rand::{rngs::StdRng, Rng, SeedableRng};
use rasterlab_image::{Image, ImageError};
use rasterlab_imgproc::benchmark::{default_filter_bank, BenchmarkDriver, FilterSpec};
use rasterlab_imgproc::filter::sigma_filter;
use rasterlab_imgproc::metrics::distortion;
use rasterlab_imgproc::noise::{default_noise_suite, NoiseModel};
use rasterlab_imgproc::parallel::ExecutionStrategy;

fn smooth_image() -> Result<Image<u8, 3>, ImageError> {
    Image::from_fn([40, 30].into(), |row, col, ch| {
        (60 + row * 2 + col * 3 + ch * 10) as u8
    })
}

#[test]
fn test_benchmark_is_reproducible() -> Result<(), ImageError> {
    let image = smooth_image()?;

    let run = |seed| {
        BenchmarkDriver::new(seed)
            .with_noise_models(default_noise_suite())
            .with_filters(default_filter_bank())
            .run(&image)
    };

    let first = run(7);
    assert_eq!(first.len(), 90);
    assert_eq!(first, run(7));
    assert_ne!(first, run(8));
    Ok(())
}

#[test]
fn test_benchmark_default_suite() -> Result<(), ImageError> {
    let image = smooth_image()?;
    let result = BenchmarkDriver::default()
        .with_strategy(ExecutionStrategy::Parallel)
        .run(&image);

    assert_eq!(result.len(), 90);
    assert_eq!(result.failures().count(), 0);

    // the pristine baseline scores are the filter distortions alone
    for entry in result.for_noise(0) {
        assert_eq!(entry.noise, NoiseModel::None);
        assert!(matches!(entry.score, Ok(score) if score >= 0.0));
    }
    Ok(())
}

#[test]
fn test_sigma_filter_reduces_gaussian_noise() -> Result<(), ImageError> {
    let image = Image::<u8, 3>::from_size_val([48, 48].into(), 120)?;
    let driver = BenchmarkDriver::new(11)
        .with_noise_model(NoiseModel::AdditiveGaussian { variance: 20.0 })
        .with_filter(FilterSpec::Sigma {
            window_size: 3,
            sigma: 0.0,
        })
        .with_filter(FilterSpec::Sigma {
            window_size: 5,
            sigma: 20.0,
        });

    let result = driver.run(&image);
    let (Some(Ok(unfiltered)), Some(Ok(filtered))) = (
        result.get(0, 0).map(|e| e.score.clone()),
        result.get(0, 1).map(|e| e.score.clone()),
    ) else {
        panic!("both pairs succeed: {result:?}");
    };

    assert!(unfiltered > 0.0);
    assert!(filtered < unfiltered, "{filtered} >= {unfiltered}");
    Ok(())
}

#[test]
fn test_sigma_filter_preserves_step_edge() -> Result<(), ImageError> {
    let image = Image::<u8, 1>::from_fn([20, 20].into(), |_, col, _| {
        if col < 10 {
            30
        } else {
            200
        }
    })?;

    let mut rng = StdRng::seed_from_u64(5);
    let noisy = Image::<u8, 1>::from_fn(image.size(), |row, col, _| {
        let jitter: i16 = rng.random_range(-3..=3);
        let val = image.as_slice()[row * 20 + col] as i16 + jitter;
        val as u8
    })?;

    let filtered = sigma_filter(&noisy, 5, 20.0)?;

    // the edge stays sharp and the noise shrinks
    for row in 2..18 {
        assert!(filtered.get(row, 9, 0)? <= 33);
        assert!(filtered.get(row, 10, 0)? >= 197);
    }
    assert!(distortion(&image, &filtered)? <= distortion(&image, &noisy)?);
    Ok(())
}

#[test]
fn test_suite_from_json() -> Result<(), serde_json::Error> {
    let models: Vec<NoiseModel> = serde_json::from_str(
        r#"[
            {"kind": "none"},
            {"kind": "brightness_dependent", "base_variance": 30.0}
        ]"#,
    )?;
    let filters: Vec<FilterSpec> = serde_json::from_str(
        r#"[
            {"kind": "median", "window_size": 3},
            {"kind": "gaussian", "kernel_size": 5, "sigma": 0.0},
            {"kind": "erode", "kernel": {"shape": "cross", "size": 3}}
        ]"#,
    )?;

    let image = Image::<u8, 3>::from_size_val([8, 8].into(), 64).expect("valid size");
    let result = BenchmarkDriver::new(0)
        .with_noise_models(models)
        .with_filters(filters)
        .run(&image);

    assert_eq!(result.len(), 6);
    let labels: Vec<_> = result.iter().map(|e| e.filter.as_str()).collect();
    assert_eq!(
        labels,
        [
            "median(3x3)",
            "gaussian(5x5, sigma=auto)",
            "erode(cross3x3)",
            "median(3x3)",
            "gaussian(5x5, sigma=auto)",
            "erode(cross3x3)",
        ]
    );
    Ok(())
}
