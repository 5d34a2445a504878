//! Cardset formats: headers, card placement and pixel decoding.

pub mod decode;
pub mod header;
pub mod layout;

pub use decode::{Encoding, Palette, rgb555};
pub use header::{
    AmigaHeader, CARD_HEIGHT, CARD_WIDTH, CardsetDescriptor, HeaderInfo, PcHeader, RawHeader,
    Variant,
};
pub use layout::{AtlasCell, LayoutMode, atlas_columns, cell_for, full_width};
