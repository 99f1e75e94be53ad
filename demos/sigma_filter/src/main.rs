use argh::FromArgs;
use std::path::PathBuf;

use rasterlab::{imgproc, io::functional as F};

#[derive(FromArgs)]
/// Apply the sigma filter to an image
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to the filtered image
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// side of the square window
    #[argh(option, default = "3")]
    window_size: usize,

    /// tolerance around the center sample
    #[argh(option, default = "20.0")]
    sigma: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    let image = F::read_image_rgb8(&args.image_path)?;
    log::info!("loaded {} ({})", args.image_path.display(), image.size());

    let filtered = imgproc::filter::sigma_filter(&image, args.window_size, args.sigma)?;

    let score = imgproc::metrics::distortion(&image, &filtered)?;
    println!(
        "sigma filter {}x{}, sigma={}: distortion to input {:.4}",
        args.window_size, args.window_size, args.sigma, score
    );

    let channels = image.split_channels()?;
    let filtered_channels = filtered.split_channels()?;
    for (name, (a, b)) in ["r", "g", "b"]
        .iter()
        .zip(channels.iter().zip(filtered_channels.iter()))
    {
        println!("  {name}: {:.4}", imgproc::metrics::distortion(a, b)?);
    }

    F::write_image_rgb8(&args.output_path, &filtered)?;
    println!("saved {}", args.output_path.display());

    Ok(())
}
