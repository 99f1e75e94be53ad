use std::path::Path;

use rasterlab_image::{Image, ImageSize, Rgb8Image};

use crate::error::IoError;

/// Reads an RGB image from the given file path.
///
/// Any format supported by the image crate is accepted. Grayscale and alpha images are
/// converted to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image containing the image data.
///
/// # Errors
///
/// [`IoError::FileDoesNotExist`] if the path does not exist and
/// [`IoError::ImageDecodeError`] if the content cannot be decoded.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Rgb8Image, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    log::debug!(
        "read {} ({}x{}, {:?})",
        file_path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB image to the given file path.
///
/// The format is chosen from the file extension, e.g. `png` or `jpg`.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to write.
///
/// # Errors
///
/// [`IoError::InvalidFileExtension`] if the extension names no known format.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Rgb8Image) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let format = image::ImageFormat::from_path(file_path)
        .map_err(|_| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    let [width, height]: [u32; 2] = image.size().into();
    image::save_buffer_with_format(
        file_path,
        image.as_slice(),
        width,
        height,
        image::ExtendedColorType::Rgb8,
        format,
    )?;

    log::debug!("wrote {} ({})", file_path.display(), image.size());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Result<Image<u8, 3>, IoError> {
        Ok(Image::from_fn([13, 7].into(), |row, col, ch| {
            (row * 30 + col * 11 + ch * 50) as u8
        })?)
    }

    #[test]
    fn read_write_png() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.png");

        let image = gradient()?;
        write_image_rgb8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        // png is lossless
        let image_back = read_image_rgb8(&file_path)?;
        assert_eq!(image_back, image);
        Ok(())
    }

    #[test]
    fn read_write_jpeg_keeps_size() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.jpg");

        write_image_rgb8(&file_path, &gradient()?)?;
        let image_back = read_image_rgb8(&file_path)?;

        assert_eq!(image_back.width(), 13);
        assert_eq!(image_back.height(), 7);
        assert_eq!(image_back.num_channels(), 3);
        Ok(())
    }

    #[test]
    fn read_missing_file() {
        let result = read_image_rgb8("does/not/exist.png");
        assert!(matches!(result, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn write_unknown_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.unknown");

        let result = write_image_rgb8(&file_path, &gradient()?);
        assert!(matches!(result, Err(IoError::InvalidFileExtension(_))));
        assert!(!file_path.exists());
        Ok(())
    }
}
