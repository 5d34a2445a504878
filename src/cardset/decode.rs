//! Pixel decoders for the four on-disk card encodings.

use std::io::{ErrorKind, Read};
use std::ops::Range;

use image::Rgb;

use crate::cardset::header::{CardsetDescriptor, PC_CARD_PREFIX, PC_REMAP_LEN, Variant};
use crate::error::ConvertError;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Shared color table of an Amiga cardset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<Rgb<u8>>);

impl Palette {
    /// Build a palette from packed RGB triples. A trailing partial triple is ignored.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        Self(
            bytes
                .chunks_exact(3)
                .map(|c| Rgb([c[0], c[1], c[2]]))
                .collect(),
        )
    }

    /// Read `entries` RGB triples from the stream.
    pub fn read<R: Read>(reader: &mut R, entries: usize) -> Result<Self, ConvertError> {
        let mut bytes = vec![0u8; entries * 3];
        reader.read_exact(&mut bytes).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                ConvertError::unsupported(format!("palette of {} entries is truncated", entries))
            } else {
                err.into()
            }
        })?;
        Ok(Self::from_rgb_bytes(&bytes))
    }

    /// Entry `index`, black when the palette is shorter.
    pub fn color(&self, index: usize) -> Rgb<u8> {
        self.0.get(index).copied().unwrap_or(BLACK)
    }
}

/// How the bytes of one card turn into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// PC, 16-bit 5-5-5 color per pixel.
    PcDirect16,
    /// PC, 8-bit indices into a per-card remap table of 5-5-5 colors.
    PcRemapped8,
    /// Amiga, `depth` bitplanes forming a palette index.
    AmigaIndexed { depth: u8 },
    /// Amiga Hold-And-Modify with `depth` bitplanes in total.
    AmigaHam { depth: u8 },
}

impl Encoding {
    pub fn for_cardset(desc: &CardsetDescriptor) -> Result<Self, ConvertError> {
        let encoding = match (desc.variant, desc.bit_depth, desc.is_ham) {
            (Variant::PcPacked, 16, false) => Encoding::PcDirect16,
            (Variant::PcPacked, 8, false) => Encoding::PcRemapped8,
            (Variant::AmigaBitplane, depth @ 1..=8, false) => Encoding::AmigaIndexed { depth },
            (Variant::AmigaBitplane, depth @ 3..=8, true) => Encoding::AmigaHam { depth },
            (variant, depth, ham) => {
                return Err(ConvertError::UnsupportedEncoding {
                    variant: variant.name(),
                    depth,
                    ham,
                });
            }
        };
        Ok(encoding)
    }

    /// Smallest card record the decoder may be handed for a `width`x`height` card.
    pub fn min_record_len(&self, width: usize, height: usize) -> usize {
        let pixels = width * height;
        match *self {
            Encoding::PcDirect16 => PC_CARD_PREFIX + 2 * pixels,
            Encoding::PcRemapped8 => PC_CARD_PREFIX + PC_REMAP_LEN + pixels,
            Encoding::AmigaIndexed { depth } | Encoding::AmigaHam { depth } => {
                (pixels * depth as usize).div_ceil(8)
            }
        }
    }

    /// Decode one card record into `out`, replacing its contents with
    /// `width * height` pixels in row-major order.
    ///
    /// A `record` shorter than [`Encoding::min_record_len`] is reported as
    /// card `index` being truncated.
    pub fn decode(
        &self,
        index: usize,
        record: &[u8],
        width: usize,
        height: usize,
        palette: &Palette,
        out: &mut Vec<Rgb<u8>>,
    ) -> Result<(), ConvertError> {
        let expected = self.min_record_len(width, height);
        if record.len() < expected {
            return Err(ConvertError::TruncatedCard { index, expected });
        }
        out.clear();
        let pixels = width * height;
        out.reserve(pixels);
        match *self {
            Encoding::PcDirect16 => decode_direct16(record, pixels, out),
            Encoding::PcRemapped8 => decode_remapped8(record, pixels, out),
            Encoding::AmigaIndexed { depth } => {
                let planes = Bitplanes::new(record, width, depth as usize);
                out.extend((0..pixels).map(|i| palette.color(planes.value(i, 0..depth as usize))));
            }
            Encoding::AmigaHam { depth } => {
                decode_ham(&Bitplanes::new(record, width, depth as usize), pixels, palette, out)
            }
        }
        Ok(())
    }
}

/// Expand a packed 5-5-5 color stored low byte first.
pub fn rgb555(lo: u8, hi: u8) -> Rgb<u8> {
    Rgb([
        (hi << 1) & 0xF8,
        ((hi << 6) | (lo >> 2)) & 0xF8,
        (lo << 3) & 0xF8,
    ])
}

fn decode_direct16(record: &[u8], pixels: usize, out: &mut Vec<Rgb<u8>>) {
    let body = &record[PC_CARD_PREFIX..PC_CARD_PREFIX + 2 * pixels];
    out.extend(body.chunks_exact(2).map(|px| rgb555(px[0], px[1])));
}

fn decode_remapped8(record: &[u8], pixels: usize, out: &mut Vec<Rgb<u8>>) {
    let remap = &record[PC_CARD_PREFIX..PC_CARD_PREFIX + PC_REMAP_LEN];
    let indices = &record[PC_CARD_PREFIX + PC_REMAP_LEN..PC_CARD_PREFIX + PC_REMAP_LEN + pixels];
    out.extend(indices.iter().map(|&index| {
        let at = 2 * index as usize;
        rgb555(remap[at], remap[at + 1])
    }));
}

/// Row-interleaved bitplanes: each scanline stores `depth` planes of
/// `width` bits one after another, most significant bit first.
struct Bitplanes<'a> {
    data: &'a [u8],
    width: usize,
    depth: usize,
}

impl<'a> Bitplanes<'a> {
    fn new(data: &'a [u8], width: usize, depth: usize) -> Self {
        Self { data, width, depth }
    }

    /// Gather the bits of `planes` for pixel `i`; plane `planes.start`
    /// becomes bit 0 of the result.
    fn value(&self, i: usize, planes: Range<usize>) -> usize {
        let (y, x) = (i / self.width, i % self.width);
        let row = y * self.width * self.depth;
        planes.enumerate().fold(0, |acc, (bit, plane)| {
            let pos = row + plane * self.width + x;
            let set = (self.data[pos / 8] >> (7 - pos % 8)) & 1;
            acc | (set as usize) << bit
        })
    }
}

fn decode_ham(planes: &Bitplanes<'_>, pixels: usize, palette: &Palette, out: &mut Vec<Rgb<u8>>) {
    let depth = planes.depth;
    let base_planes = depth.saturating_sub(2);
    let shift = 10usize.saturating_sub(depth);
    let mut color = palette.color(0);
    for i in 0..pixels {
        if i % planes.width == 0 {
            color = palette.color(0);
        }
        let base = planes.value(i, 0..base_planes);
        let hold = planes.value(i, base_planes..depth);
        let Rgb([r, g, b]) = color;
        let level = (base << shift) as u8;
        color = match hold {
            0 => palette.color(base),
            1 => Rgb([r, g, level]),
            2 => Rgb([level, g, b]),
            _ => Rgb([r, level, b]),
        };
        out.push(color);
    }
}
