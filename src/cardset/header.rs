//! Cardset header parsing.
//!
//! Both container formats start with a single sniffed byte followed by a
//! 21-byte header. PC cardsets (`PCREKO`) store their integers little-endian,
//! Amiga cardsets (`REKO`) big-endian.

use std::fmt;
use std::io::{ErrorKind, Read};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cardset::layout::{LayoutMode, REKO_II};
use crate::error::ConvertError;

/// Bytes following the sniffed leading byte.
pub const HEADER_LEN: usize = 21;
/// Fixed card dimensions of every supported cardset.
pub const CARD_WIDTH: u32 = 88;
pub const CARD_HEIGHT: u32 = 130;
/// Amiga display mode flag for Hold-And-Modify.
pub const HAM_FLAG: u32 = 0x800;

const PC_MAGIC: &[u8; 5] = b"CREKO";
const AMIGA_MAGIC: &[u8; 3] = b"EKO";
const PC_CARDS: u8 = 57;
/// Per-card prefix in PC cardsets, skipped by the decoder.
pub const PC_CARD_PREFIX: usize = 4;
/// Inline remap table of an 8-bit PC card: 256 packed 16-bit colors.
pub const PC_REMAP_LEN: usize = 512;

/// The two on-disk container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    PcPacked,
    AmigaBitplane,
}

impl Variant {
    /// Route on the first byte of the stream.
    pub fn sniff(leading: u8) -> Result<Self, ConvertError> {
        match leading {
            b'P' => Ok(Variant::PcPacked),
            b'R' => Ok(Variant::AmigaBitplane),
            other => Err(ConvertError::UnrecognizedFormat(Some(other))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::PcPacked => "PC",
            Variant::AmigaBitplane => "Amiga",
        }
    }
}

/// Header fields of a `PCREKO` cardset, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcHeader {
    pub tag: [u8; 2],
    pub body_size: u32,
    pub card_size: u32,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub cards: u8,
}

/// Header fields of an Amiga `REKO` cardset, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmigaHeader {
    pub card_size: u32,
    pub height: u16,
    pub width: u16,
    pub mode_id: u32,
    pub depth: u8,
    pub cards: u8,
}

impl AmigaHeader {
    pub fn is_ham(&self) -> bool {
        self.mode_id & HAM_FLAG != 0
    }

    /// Entries of the shared palette stored right after the header.
    pub fn palette_entries(&self) -> usize {
        let bits = if self.is_ham() {
            self.depth.saturating_sub(2)
        } else {
            self.depth
        };
        1usize << bits.min(16)
    }

    /// Card count after the DT39 clamp.
    pub fn effective_cards(&self, mode: LayoutMode) -> usize {
        let cards = self.cards as usize;
        if mode == LayoutMode::RekoDt39 {
            cards.min(REKO_II)
        } else {
            cards
        }
    }
}

/// A header whose magic matched but whose values are not judged yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawHeader {
    Pc(PcHeader),
    Amiga(AmigaHeader),
}

/// Validated shape of one cardset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardsetDescriptor {
    pub variant: Variant,
    pub card_width: u32,
    pub card_height: u32,
    pub bit_depth: u8,
    pub is_ham: bool,
    pub card_count: usize,
    pub card_payload_size: usize,
    /// Whole-file payload size; PC cardsets only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_size: Option<u32>,
}

impl CardsetDescriptor {
    pub fn pixels_per_card(&self) -> usize {
        self.card_width as usize * self.card_height as usize
    }

    /// Bytes consumed from the stream for every card.
    pub fn record_len(&self) -> usize {
        match (self.variant, self.bit_depth) {
            (Variant::PcPacked, 8) => PC_CARD_PREFIX + PC_REMAP_LEN + self.card_payload_size,
            (Variant::PcPacked, _) => PC_CARD_PREFIX + self.card_payload_size,
            (Variant::AmigaBitplane, _) => self.card_payload_size,
        }
    }

    /// Entries of the shared palette preceding the cards, if the format has one.
    pub fn palette_entries(&self) -> Option<usize> {
        match self.variant {
            Variant::PcPacked => None,
            Variant::AmigaBitplane if self.is_ham => Some(1 << (self.bit_depth - 2)),
            Variant::AmigaBitplane => Some(1 << self.bit_depth),
        }
    }

    /// Layout slot of the first stored card. PC cardsets lack the two
    /// leading extra cards, so their cards start at slot 2.
    pub fn first_slot(&self) -> usize {
        match self.variant {
            Variant::PcPacked => 2,
            Variant::AmigaBitplane => 0,
        }
    }

    /// Number of layout slots the atlas is sized for.
    pub fn atlas_slots(&self) -> usize {
        self.card_count + self.first_slot()
    }
}

impl RawHeader {
    /// Read the leading byte and the fixed header that follows it.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, ConvertError> {
        let mut leading = [0u8; 1];
        let variant = match reader.read_exact(&mut leading) {
            Ok(()) => Variant::sniff(leading[0])?,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                return Err(ConvertError::UnrecognizedFormat(None));
            }
            Err(err) => return Err(err.into()),
        };

        let mut header = [0u8; HEADER_LEN];
        reader.read_exact(&mut header).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                ConvertError::unsupported(format!("{} header is truncated", variant.name()))
            } else {
                err.into()
            }
        })?;
        Self::parse(variant, &header)
    }

    /// Extract the fields of a header; only the magic tag is checked.
    pub fn parse(variant: Variant, header: &[u8; HEADER_LEN]) -> Result<Self, ConvertError> {
        match variant {
            Variant::PcPacked => {
                if &header[..5] != PC_MAGIC {
                    return Err(ConvertError::unsupported("missing CREKO magic"));
                }
                Ok(RawHeader::Pc(PcHeader {
                    tag: [header[5], header[6]],
                    body_size: le32(&header[7..11]),
                    card_size: le32(&header[11..15]),
                    width: le16(&header[15..17]),
                    height: le16(&header[17..19]),
                    depth: header[19],
                    cards: header[20],
                }))
            }
            Variant::AmigaBitplane => {
                if &header[..3] != AMIGA_MAGIC {
                    return Err(ConvertError::unsupported("missing REKO magic"));
                }
                Ok(RawHeader::Amiga(AmigaHeader {
                    card_size: be32(&header[7..11]),
                    height: be16(&header[11..13]),
                    width: be16(&header[13..15]),
                    mode_id: be32(&header[15..19]),
                    depth: header[19],
                    cards: header[20],
                }))
            }
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            RawHeader::Pc(_) => Variant::PcPacked,
            RawHeader::Amiga(_) => Variant::AmigaBitplane,
        }
    }

    /// Diagnostic summary of the stored fields.
    pub fn info(&self, mode: LayoutMode) -> HeaderInfo {
        match self {
            RawHeader::Pc(h) => HeaderInfo {
                variant: Variant::PcPacked,
                card_size: h.card_size,
                height: h.height,
                width: h.width,
                mode_id: None,
                ham: false,
                depth: h.depth,
                cards: h.cards,
                full_size: h.cards as u64 * (4 + h.card_size as u64) + 22,
            },
            RawHeader::Amiga(h) => HeaderInfo {
                variant: Variant::AmigaBitplane,
                card_size: h.card_size,
                height: h.height,
                width: h.width,
                mode_id: Some(h.mode_id),
                ham: h.is_ham(),
                depth: h.depth,
                cards: h.cards,
                full_size: h.effective_cards(mode) as u64 * h.card_size as u64
                    + 22
                    + 3 * h.palette_entries() as u64,
            },
        }
    }

    /// Check the header against the cardset shapes this crate can decode.
    pub fn validate(self, mode: LayoutMode) -> Result<CardsetDescriptor, ConvertError> {
        match self {
            RawHeader::Pc(h) => validate_pc(h),
            RawHeader::Amiga(h) => validate_amiga(h, mode),
        }
    }
}

fn validate_pc(h: PcHeader) -> Result<CardsetDescriptor, ConvertError> {
    let known = matches!(
        (&h.tag, h.body_size, h.card_size, h.depth),
        (b"D ", 681_492, 11_440, 8) | ([0, 0], 1_304_388, 22_880, 16)
    );
    if !known {
        return Err(ConvertError::unsupported(format!(
            "unknown PC cardset shape (body {}, card {}, depth {})",
            h.body_size, h.card_size, h.depth
        )));
    }
    check_dimensions(h.width, h.height)?;
    if h.cards != PC_CARDS {
        return Err(ConvertError::unsupported(format!(
            "PC cardsets hold {} cards, header says {}",
            PC_CARDS, h.cards
        )));
    }
    debug!(body_size = h.body_size, depth = h.depth, "PC cardset header accepted");
    Ok(CardsetDescriptor {
        variant: Variant::PcPacked,
        card_width: h.width as u32,
        card_height: h.height as u32,
        bit_depth: h.depth,
        is_ham: false,
        card_count: h.cards as usize,
        card_payload_size: h.card_size as usize,
        body_size: Some(h.body_size),
    })
}

fn validate_amiga(h: AmigaHeader, mode: LayoutMode) -> Result<CardsetDescriptor, ConvertError> {
    check_dimensions(h.width, h.height)?;
    let is_ham = h.is_ham();
    let depth_ok = if is_ham {
        (3..=8).contains(&h.depth)
    } else {
        (1..=8).contains(&h.depth)
    };
    if !depth_ok {
        return Err(ConvertError::unsupported(format!(
            "bitplane depth {} is out of range",
            h.depth
        )));
    }

    let planes_len = h.width as usize / 8 * h.height as usize * h.depth as usize;
    if (h.card_size as usize) < planes_len {
        return Err(ConvertError::unsupported(format!(
            "card size {} cannot hold {} bytes of bitplanes",
            h.card_size, planes_len
        )));
    }

    let card_count = h.effective_cards(mode);
    if card_count < h.cards as usize {
        warn!(
            stored = h.cards,
            kept = card_count,
            "DT39 layout has no slot for trailing cards, dropping them"
        );
    }
    debug!(mode_id = h.mode_id, depth = h.depth, ham = is_ham, "Amiga cardset header accepted");
    Ok(CardsetDescriptor {
        variant: Variant::AmigaBitplane,
        card_width: h.width as u32,
        card_height: h.height as u32,
        bit_depth: h.depth,
        is_ham,
        card_count,
        card_payload_size: h.card_size as usize,
        body_size: None,
    })
}

fn check_dimensions(width: u16, height: u16) -> Result<(), ConvertError> {
    if width as u32 != CARD_WIDTH || height as u32 != CARD_HEIGHT {
        return Err(ConvertError::unsupported(format!(
            "cards are {}x{}, only {}x{} is supported",
            width, height, CARD_WIDTH, CARD_HEIGHT
        )));
    }
    Ok(())
}

fn le16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn be16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

fn be32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

/// Header fields printed by info mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    pub variant: Variant,
    pub card_size: u32,
    pub height: u16,
    pub width: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_id: Option<u32>,
    pub ham: bool,
    pub depth: u8,
    pub cards: u8,
    /// Expected size of the whole file in bytes.
    pub full_size: u64,
}

impl fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CardSize: {}", self.card_size)?;
        writeln!(f, "Height:   {}", self.height)?;
        writeln!(f, "Width:    {}", self.width)?;
        if let Some(mode_id) = self.mode_id {
            let ham = if self.ham { " HAM" } else { "" };
            writeln!(f, "ModeId:   0x{:x}{}", mode_id, ham)?;
        }
        writeln!(f, "Depth:    {}", self.depth)?;
        writeln!(f, "Cards:    {}", self.cards)?;
        writeln!(f, "FullSize: {}", self.full_size)
    }
}
