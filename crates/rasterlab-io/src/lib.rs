#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and encoding/decoding failures.
pub mod error;

/// High-level image reading and writing functions.
///
/// The format is guessed from the file content when reading and from the file
/// extension when writing. See [`functional::read_image_rgb8`].
pub mod functional;
