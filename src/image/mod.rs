//! Atlas raster composition and serialization.

mod atlas;
mod writer;

pub use atlas::{AtlasComposer, BACK_COLOR, BORDER_COLOR};
pub use writer::{MAX_CHANNEL, OutputFormat, write_atlas};
