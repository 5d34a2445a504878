//! End-to-end conversion of one cardset stream into one atlas image.

use std::io::{ErrorKind, Read, Write};

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::cardset::decode::{Encoding, Palette};
use crate::cardset::header::{CardsetDescriptor, HeaderInfo, RawHeader, Variant};
use crate::cardset::layout::{LayoutMode, cell_for};
use crate::error::ConvertError;
use crate::image::{AtlasComposer, OutputFormat, write_atlas};

/// Knobs of a single conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub mode: LayoutMode,
    /// Synthesize a back card; only PC cardsets lack one.
    pub back_card: bool,
}

/// Decode every card of `input` into an atlas image.
///
/// Nothing is returned unless all cards decode; a short card aborts the run.
pub fn render_atlas<R: Read>(
    input: &mut R,
    options: &ConvertOptions,
) -> Result<RgbImage, ConvertError> {
    let desc = RawHeader::read(input)?.validate(options.mode)?;
    let encoding = Encoding::for_cardset(&desc)?;
    let palette = match desc.palette_entries() {
        Some(entries) => Palette::read(input, entries)?,
        None => Palette::from_rgb_bytes(&[]),
    };

    let (width, height) = (desc.card_width as usize, desc.card_height as usize);
    if desc.record_len() < encoding.min_record_len(width, height) {
        return Err(ConvertError::unsupported(format!(
            "card records of {} bytes are too short for {}x{} pixels",
            desc.record_len(),
            width,
            height
        )));
    }

    let mut atlas = AtlasComposer::new(
        desc.atlas_slots(),
        options.mode,
        desc.card_width,
        desc.card_height,
    )?;
    info!(
        variant = desc.variant.name(),
        depth = desc.bit_depth,
        ham = desc.is_ham,
        cards = desc.card_count,
        width = atlas.width(),
        height = atlas.height(),
        "converting cardset"
    );

    let mut record = vec![0u8; desc.record_len()];
    let mut pixels = Vec::with_capacity(desc.pixels_per_card());
    for index in 0..desc.card_count {
        read_card(input, &mut record, index)?;
        encoding.decode(index, &record, width, height, &palette, &mut pixels)?;
        let cell = cell_for(index + desc.first_slot(), options.mode);
        debug!(card = index, col = cell.col, row = cell.row, "placing card");
        atlas.place(cell, &pixels)?;
    }

    if options.back_card {
        match desc.variant {
            Variant::PcPacked => atlas.draw_back_card(options.mode)?,
            Variant::AmigaBitplane => warn!("Amiga cardsets carry their own back card, ignoring"),
        }
    }
    Ok(atlas.into_image())
}

/// Convert `input` and write the atlas to `output`.
pub fn convert<R: Read, W: Write>(
    input: &mut R,
    output: W,
    options: &ConvertOptions,
    format: OutputFormat,
) -> Result<(), ConvertError> {
    let image = render_atlas(input, options)?;
    write_atlas(&image, format, output)
}

/// Read only the header and describe it. Unsupported shapes are still
/// described, as long as the magic tag matches.
pub fn read_info<R: Read>(input: &mut R, mode: LayoutMode) -> Result<HeaderInfo, ConvertError> {
    Ok(RawHeader::read(input)?.info(mode))
}

/// Parse and validate the header without decoding any card.
pub fn read_descriptor<R: Read>(
    input: &mut R,
    mode: LayoutMode,
) -> Result<CardsetDescriptor, ConvertError> {
    RawHeader::read(input)?.validate(mode)
}

fn read_card<R: Read>(input: &mut R, record: &mut [u8], index: usize) -> Result<(), ConvertError> {
    input.read_exact(record).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            ConvertError::TruncatedCard {
                index,
                expected: record.len(),
            }
        } else {
            err.into()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_leading_byte_writes_nothing() {
        let mut input: &[u8] = b"GIF89a";
        let mut out = Vec::new();
        let result = convert(
            &mut input,
            &mut out,
            &ConvertOptions::default(),
            OutputFormat::Ppm,
        );
        assert!(matches!(result, Err(ConvertError::UnrecognizedFormat(Some(b'G')))));
        assert_eq!(out, Vec::<u8>::new());
    }

    #[test]
    fn info_does_not_need_a_valid_shape() {
        let mut header = b"PCREKO".to_vec();
        header.extend_from_slice(&[0; 16]);
        let info = read_info(&mut header.as_slice(), LayoutMode::Normal).unwrap();
        assert_eq!(info.variant, Variant::PcPacked);
        assert_eq!(info.full_size, 22);
        assert!(matches!(
            read_descriptor(&mut header.as_slice(), LayoutMode::Normal),
            Err(ConvertError::UnsupportedCardset(_))
        ));
    }
}
