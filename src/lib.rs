//! Decoding of PC and Amiga REKO cardsets into a single card atlas.
//!
//! A cardset stream is sniffed, its header validated, and every card decoded
//! and placed into a grid four cards high. The finished atlas is written as a
//! binary PPM (or PNG).

pub mod cardset;
mod convert;
mod error;
pub mod image;

pub use crate::cardset::{
    AtlasCell, CardsetDescriptor, Encoding, HeaderInfo, LayoutMode, Palette, RawHeader, Variant,
    atlas_columns, cell_for, full_width,
};
pub use crate::convert::{ConvertOptions, convert, read_descriptor, read_info, render_atlas};
pub use crate::error::ConvertError;
pub use crate::image::{AtlasComposer, OutputFormat, write_atlas};
