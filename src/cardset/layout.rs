//! Placement of cards inside the atlas grid.
//!
//! Cardsets store their cards in a historical order shared by several Amiga
//! cardset tools. The atlas puts each card into a fixed cell: a 68-entry table
//! covering the largest known deck (REKO-III), corrected per layout mode, with
//! a plain column-major fallback for anything beyond the table.

use serde::Serialize;

/// Number of card rows in every atlas.
pub const FULL_HEIGHT: u32 = 4;
/// Columns of an atlas holding a REKO-I deck.
pub const NORM_WIDTH: u32 = 14;
/// Columns of an atlas holding a REKO-II or REKO-III deck.
pub const FULL_WIDTH: u32 = 17;
/// Cards in a REKO-I cardset.
pub const REKO_I: usize = 55;
/// Cards in a REKO-II cardset.
pub const REKO_II: usize = 59;
/// Cards in a REKO-III cardset.
pub const REKO_III: usize = 68;

/// Card order convention expected by the consumer of the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Normal,
    /// Order used by the Amiga `mreko` datatype.
    MReko,
    /// Order used by the Amiga V39 `reko` datatype.
    RekoDt39,
}

/// Grid position of one card, in card units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasCell {
    pub col: u32,
    pub row: u32,
}

impl AtlasCell {
    const fn at(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

#[rustfmt::skip]
const MAPPING: [(u32, u32); REKO_III] = [
    (13, 2), (13, 1), (13, 0),
    ( 0, 0), ( 0, 1), ( 0, 2), ( 0, 3),
    ( 1, 0), ( 1, 1), ( 1, 2), ( 1, 3),
    ( 2, 0), ( 2, 1), ( 2, 2), ( 2, 3),
    ( 3, 0), ( 3, 1), ( 3, 2), ( 3, 3),
    ( 4, 0), ( 4, 1), ( 4, 2), ( 4, 3),
    ( 5, 0), ( 5, 1), ( 5, 2), ( 5, 3),
    ( 6, 0), ( 6, 1), ( 6, 2), ( 6, 3),
    ( 7, 0), ( 7, 1), ( 7, 2), ( 7, 3),
    ( 8, 0), ( 8, 1), ( 8, 2), ( 8, 3),
    ( 9, 0), ( 9, 1), ( 9, 2), ( 9, 3),
    (10, 0), (10, 1), (10, 2), (10, 3),
    (11, 0), (11, 1), (11, 2), (11, 3),
    (12, 0), (12, 1), (12, 2), (12, 3),
    (13, 3), (14, 3), (15, 3), (16, 3),
    (14, 0), (15, 0), (16, 0),
    (14, 1), (15, 1), (16, 1),
    (14, 2), (15, 2), (16, 2),
];

/// Number of atlas columns needed for `cards` cards.
pub fn full_width(cards: usize) -> u32 {
    if cards <= REKO_I {
        NORM_WIDTH
    } else if cards <= REKO_III {
        FULL_WIDTH
    } else {
        cards.div_ceil(FULL_HEIGHT as usize) as u32
    }
}

/// Columns needed to hold every one of `slots` cards placed under `mode`.
///
/// This is [`full_width`] unless a mode override moves a card past it, as
/// DT39 does with the extra cards of a small cardset.
pub fn atlas_columns(slots: usize, mode: LayoutMode) -> u32 {
    (0..slots)
        .map(|index| cell_for(index, mode).col + 1)
        .fold(full_width(slots), u32::max)
}

/// Atlas cell of the zero-based card `index` under `mode`.
pub fn cell_for(index: usize, mode: LayoutMode) -> AtlasCell {
    let Some(&(col, row)) = MAPPING.get(index) else {
        return AtlasCell::at(
            (index / FULL_HEIGHT as usize) as u32,
            (index % FULL_HEIGHT as usize) as u32,
        );
    };
    let mut cell = AtlasCell::at(col, row);

    if index < 3 {
        // the three extra cards
        match mode {
            LayoutMode::MReko => cell.row = index as u32 + 1,
            LayoutMode::RekoDt39 => cell = AtlasCell::at(13 + index as u32, 1),
            LayoutMode::Normal => {}
        }
    } else if index >= REKO_I && mode != LayoutMode::Normal {
        if index < REKO_II {
            // stack cards
            cell.row = 0;
        } else if mode == LayoutMode::RekoDt39 && index < REKO_II + 2 {
            cell = AtlasCell::at(13, (index - REKO_II) as u32 + 2);
        } else {
            cell.row += 1;
        }
    }
    cell
}
