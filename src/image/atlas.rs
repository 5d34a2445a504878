use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::cardset::layout::{AtlasCell, FULL_HEIGHT, LayoutMode, atlas_columns, cell_for};
use crate::error::ConvertError;

/// Background of the atlas and of the synthesized back card.
pub const BACK_COLOR: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);
/// Frame of the synthesized back card.
pub const BORDER_COLOR: Rgb<u8> = Rgb([0xF0, 0xF0, 0xF0]);

/// Owns the atlas raster while cards are placed into it.
#[derive(Debug, Clone)]
pub struct AtlasComposer {
    image: RgbImage,
    card_width: u32,
    card_height: u32,
}

impl AtlasComposer {
    /// Allocate a black atlas wide enough for `slots` layout slots placed
    /// under `mode`.
    pub fn new(
        slots: usize,
        mode: LayoutMode,
        card_width: u32,
        card_height: u32,
    ) -> Result<Self, ConvertError> {
        let width = atlas_columns(slots, mode)
            .checked_mul(card_width)
            .ok_or_else(|| ConvertError::unsupported("atlas width overflows"))?;
        let height = FULL_HEIGHT
            .checked_mul(card_height)
            .ok_or_else(|| ConvertError::unsupported("atlas height overflows"))?;
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| ConvertError::unsupported("atlas size overflows"))?;

        let mut raw = Vec::new();
        raw.try_reserve_exact(bytes)
            .map_err(|source| ConvertError::AllocationFailure { bytes, source })?;
        raw.resize(bytes, 0);
        let image = ImageBuffer::from_raw(width, height, raw)
            .ok_or_else(|| ConvertError::unsupported("atlas buffer has the wrong size"))?;

        Ok(Self {
            image,
            card_width,
            card_height,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Copy a decoded card into `cell`, row-major, `card_width` pixels per row.
    pub fn place(&mut self, cell: AtlasCell, pixels: &[Rgb<u8>]) -> Result<(), ConvertError> {
        let (x0, y0) = self.origin(cell)?;
        let width = self.card_width as usize;
        for (i, &pixel) in pixels
            .iter()
            .take(width * self.card_height as usize)
            .enumerate()
        {
            let x = x0 + (i % width) as u32;
            let y = y0 + (i / width) as u32;
            self.image.put_pixel(x, y, pixel);
        }
        Ok(())
    }

    /// Draw a plain back card into the slot of card 1: background with a one
    /// pixel frame whose corner pixels stay background.
    pub fn draw_back_card(&mut self, mode: LayoutMode) -> Result<(), ConvertError> {
        let (x0, y0) = self.origin(cell_for(1, mode))?;
        let (x0, y0) = (x0 as i32, y0 as i32);
        let (w, h) = (self.card_width, self.card_height);

        draw_filled_rect_mut(&mut self.image, Rect::at(x0, y0).of_size(w, h), BACK_COLOR);
        if w < 3 || h < 3 {
            return Ok(());
        }
        let edges = [
            Rect::at(x0 + 1, y0).of_size(w - 2, 1),
            Rect::at(x0 + 1, y0 + h as i32 - 1).of_size(w - 2, 1),
            Rect::at(x0, y0 + 1).of_size(1, h - 2),
            Rect::at(x0 + w as i32 - 1, y0 + 1).of_size(1, h - 2),
        ];
        for edge in edges {
            draw_filled_rect_mut(&mut self.image, edge, BORDER_COLOR);
        }
        Ok(())
    }

    /// Top-left pixel of `cell`, rejecting cells outside the atlas.
    fn origin(&self, cell: AtlasCell) -> Result<(u32, u32), ConvertError> {
        let x = cell.col * self.card_width;
        let y = cell.row * self.card_height;
        if x + self.card_width > self.width() || y + self.card_height > self.height() {
            return Err(ConvertError::unsupported(format!(
                "cell ({}, {}) lies outside the {}x{} atlas",
                cell.col,
                cell.row,
                self.width(),
                self.height()
            )));
        }
        Ok((x, y))
    }
}
