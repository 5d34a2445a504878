use std::io::{self, Write};

use image::codecs::png::PngEncoder;
use image::{ImageError, RgbImage};

use crate::error::ConvertError;

/// Largest channel value written to the PPM header.
pub const MAX_CHANNEL: u8 = 255;

/// Container the finished atlas is serialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Binary PPM (`P6`), the native output.
    #[default]
    Ppm,
    Png,
}

/// Serialize `image` to `out`.
pub fn write_atlas<W: Write>(
    image: &RgbImage,
    format: OutputFormat,
    mut out: W,
) -> Result<(), ConvertError> {
    match format {
        OutputFormat::Ppm => write_ppm(image, &mut out)?,
        OutputFormat::Png => image
            .write_with_encoder(PngEncoder::new(&mut out))
            .map_err(|err| match err {
                ImageError::IoError(io) => ConvertError::Io(io),
                other => ConvertError::Io(io::Error::other(other)),
            })?,
    }
    out.flush()?;
    Ok(())
}

/// Header lines followed by the raw RGB bytes, nothing else.
fn write_ppm<W: Write>(image: &RgbImage, out: &mut W) -> io::Result<()> {
    write!(
        out,
        "P6\n{}\n{}\n{}\n",
        image.width(),
        image.height(),
        MAX_CHANNEL
    )?;
    out.write_all(image.as_raw())
}
