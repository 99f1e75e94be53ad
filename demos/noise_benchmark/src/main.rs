use argh::FromArgs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rasterlab::{
    image::Image,
    imgproc::{
        benchmark::{BenchmarkConfig, BenchmarkDriver, BenchmarkReporter, BenchmarkResult},
        noise::NoiseModel,
        parallel::ExecutionStrategy,
    },
    io::functional as F,
};

#[derive(FromArgs)]
/// Score a denoising filter bank against a set of noise models
struct Args {
    /// path to the pristine image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// seed of the noise generators, overrides the config file
    #[argh(option)]
    seed: Option<u64>,

    /// JSON file with the noise models and filters to run
    #[argh(option)]
    config: Option<PathBuf>,

    /// write the full report as JSON to this file
    #[argh(option)]
    output: Option<PathBuf>,

    /// save the degraded and filtered images of the first noisy model to this directory
    #[argh(option)]
    save_dir: Option<PathBuf>,

    /// run the noise models and filters in parallel
    #[argh(switch)]
    parallel: bool,
}

/// Prints the scores as a table, one block per noise model.
struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> BenchmarkReporter for ConsoleReporter<W> {
    type Error = std::io::Error;

    fn report(&mut self, result: &BenchmarkResult) -> Result<(), Self::Error> {
        let mut current = None;
        for entry in result {
            if current != Some(entry.noise_index) {
                current = Some(entry.noise_index);
                writeln!(self.out)?;
                writeln!(self.out, "noise: {}", entry.noise)?;
            }
            match &entry.score {
                Ok(score) => writeln!(self.out, "  {:<52} {:>10.4}", entry.filter, score)?,
                Err(err) => writeln!(self.out, "  {:<52} {:>10} ({err})", entry.filter, "failed")?,
            }
        }
        self.out.flush()
    }
}

fn save_first_noisy(
    driver: &BenchmarkDriver<3>,
    config: &BenchmarkConfig,
    image: &Image<u8, 3>,
    save_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(noise_index) = config
        .noise_models
        .iter()
        .position(|m| *m != NoiseModel::None)
    else {
        log::warn!("no noisy model configured, nothing to save");
        return Ok(());
    };

    let Some(degraded) = driver.degrade(image, noise_index) else {
        return Ok(());
    };
    let degraded = degraded?;

    std::fs::create_dir_all(save_dir)?;
    F::write_image_rgb8(save_dir.join("noisy.png"), &degraded)?;

    for (filter_index, filter) in config.filters.iter().enumerate() {
        match filter.filter(&degraded) {
            Ok(filtered) => {
                let name: String = filter
                    .to_string()
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect();
                let path = save_dir.join(format!("{filter_index:02}_{name}.png"));
                F::write_image_rgb8(&path, &filtered)?;
            }
            Err(err) => log::warn!("{filter}: {err}"),
        }
    }

    println!(
        "saved filtered images of '{}' to {}",
        config.noise_models[noise_index],
        save_dir.display()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let image = F::read_image_rgb8(&args.image_path)?;
    log::info!("loaded {} ({})", args.image_path.display(), image.size());

    let mut config = match &args.config {
        Some(path) => serde_json::from_str::<BenchmarkConfig>(&std::fs::read_to_string(path)?)?,
        None => BenchmarkConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.parallel {
        config.strategy = ExecutionStrategy::Parallel;
    }

    let driver = BenchmarkDriver::<3>::from_config(config.clone());

    let mut reporter = ConsoleReporter {
        out: std::io::stdout().lock(),
    };
    let result = driver.run_and_report(&image, &mut reporter)?;

    let failures = result.failures().count();
    if failures > 0 {
        log::warn!("{failures} of {} pairs failed", result.len());
    }

    if let Some(output) = &args.output {
        let file = std::fs::File::create(output)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &result)?;
        println!("wrote report to {}", output.display());
    }

    if let Some(save_dir) = &args.save_dir {
        save_first_noisy(&driver, &config, &image, save_dir)?;
    }

    Ok(())
}
