use image::Rgb;
use pretty_assertions::assert_eq;
use rekoatlas::{
    ConvertError, ConvertOptions, LayoutMode, OutputFormat, Variant, convert, read_info,
    render_atlas,
};

const W: usize = 88;
const H: usize = 130;
const PC8_CARD: usize = 11_440;
const PC16_CARD: usize = 22_880;

fn pc8_header(tag: &[u8; 2]) -> Vec<u8> {
    let mut bytes = b"PCREKO".to_vec();
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(&681_492u32.to_le_bytes());
    bytes.extend_from_slice(&(PC8_CARD as u32).to_le_bytes());
    bytes.extend_from_slice(&(W as u16).to_le_bytes());
    bytes.extend_from_slice(&(H as u16).to_le_bytes());
    bytes.push(8);
    bytes.push(57);
    bytes
}

/// 57 cards; card `n` paints every pixel with remap entry `n`, which holds a
/// pure red of intensity `n`.
fn pc8_cardset() -> Vec<u8> {
    let mut bytes = pc8_header(b"D ");
    for card in 0..57u8 {
        bytes.extend_from_slice(&[0; 4]);
        let mut remap = [0u8; 512];
        // red lives in bits 10..14 of the little-endian word
        remap[2 * card as usize + 1] = (card & 0x1F) << 2;
        bytes.extend_from_slice(&remap);
        bytes.extend(std::iter::repeat_n(card, PC8_CARD));
    }
    bytes
}

/// 57 cards of pure blue whose last pixel is pure red.
fn pc16_cardset() -> Vec<u8> {
    let mut bytes = b"PCREKO".to_vec();
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&1_304_388u32.to_le_bytes());
    bytes.extend_from_slice(&(PC16_CARD as u32).to_le_bytes());
    bytes.extend_from_slice(&(W as u16).to_le_bytes());
    bytes.extend_from_slice(&(H as u16).to_le_bytes());
    bytes.push(16);
    bytes.push(57);
    for _ in 0..57 {
        bytes.extend_from_slice(&[0; 4]);
        for _ in 0..W * H - 1 {
            bytes.extend_from_slice(&[0x1F, 0x00]);
        }
        bytes.extend_from_slice(&[0x00, 0x7C]);
    }
    bytes
}

fn amiga_cardset(mode_id: u32, depth: u8, stored: u8, written: usize, palette: &[u8]) -> Vec<u8> {
    let card_size = W / 8 * H * depth as usize;
    let mut bytes = b"REKO".to_vec();
    bytes.extend_from_slice(&[0; 4]);
    bytes.extend_from_slice(&(card_size as u32).to_be_bytes());
    bytes.extend_from_slice(&(H as u16).to_be_bytes());
    bytes.extend_from_slice(&(W as u16).to_be_bytes());
    bytes.extend_from_slice(&mode_id.to_be_bytes());
    bytes.push(depth);
    bytes.push(stored);
    bytes.extend_from_slice(palette);
    bytes.extend(std::iter::repeat_n(0u8, card_size * written));
    bytes
}

fn ppm_header(width: usize, height: usize) -> Vec<u8> {
    format!("P6\n{}\n{}\n255\n", width, height).into_bytes()
}

#[test]
fn pc_cardset_fills_a_seventeen_column_atlas() {
    let input = pc8_cardset();
    let mut out = Vec::new();
    convert(
        &mut input.as_slice(),
        &mut out,
        &ConvertOptions::default(),
        OutputFormat::Ppm,
    )
    .unwrap();

    let header = ppm_header(17 * W, 4 * H);
    assert_eq!(&out[..header.len()], header.as_slice());
    assert_eq!(out.len(), header.len() + 17 * W * 4 * H * 3);
}

#[test]
fn pc_cards_start_at_slot_two() {
    let image = render_atlas(&mut pc8_cardset().as_slice(), &ConvertOptions::default()).unwrap();
    // stored card 0 -> slot 2 -> column 13, row 0; color index 0 is black
    assert_eq!(*image.get_pixel(13 * 88, 0), Rgb([0, 0, 0]));
    // stored card 1 -> slot 3 -> column 0, row 0
    assert_eq!(*image.get_pixel(0, 0), Rgb([8, 0, 0]));
    assert_eq!(*image.get_pixel(87, 129), Rgb([8, 0, 0]));
    // stored card 5 -> slot 7 -> column 1, row 0
    assert_eq!(*image.get_pixel(88, 0), Rgb([40, 0, 0]));
    // slots 0 and 1 are never stored in PC cardsets
    assert_eq!(*image.get_pixel(13 * 88 + 10, 2 * 130 + 10), Rgb([0, 0, 0]));
}

#[test]
fn pc_direct_color_cards_decode_to_the_last_pixel() {
    let image = render_atlas(&mut pc16_cardset().as_slice(), &ConvertOptions::default()).unwrap();
    assert_eq!((image.width(), image.height()), (17 * 88, 4 * 130));

    let blue = Rgb([0, 0, 0xF8]);
    let red = Rgb([0xF8, 0, 0]);
    // stored card 1 -> slot 3 -> column 0, row 0
    assert_eq!(*image.get_pixel(0, 0), blue);
    assert_eq!(*image.get_pixel(86, 129), blue);
    assert_eq!(*image.get_pixel(87, 129), red);
    // stored card 0 -> slot 2 -> column 13, row 0
    assert_eq!(*image.get_pixel(13 * 88 + 87, 129), red);
    // stored card 56 -> slot 58 -> column 16, row 0
    assert_eq!(*image.get_pixel(16 * 88 + 87, 129), red);
}

#[test]
fn back_card_is_drawn_for_pc_cardsets() {
    let options = ConvertOptions {
        mode: LayoutMode::Normal,
        back_card: true,
    };
    let image = render_atlas(&mut pc8_cardset().as_slice(), &options).unwrap();
    let (x0, y0) = (13 * 88, 130);
    assert_eq!(*image.get_pixel(x0 + 1, y0), Rgb([0xF0, 0xF0, 0xF0]));
    assert_eq!(*image.get_pixel(x0, y0), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(x0 + 40, y0 + 40), Rgb([0, 0, 0]));
}

#[test]
fn truncated_card_aborts_without_output() {
    let mut input = pc8_cardset();
    input.pop();
    let mut out = Vec::new();
    let result = convert(
        &mut input.as_slice(),
        &mut out,
        &ConvertOptions::default(),
        OutputFormat::Ppm,
    );
    assert!(matches!(
        result,
        Err(ConvertError::TruncatedCard { index: 56, .. })
    ));
    assert!(out.is_empty());
}

#[test]
fn unknown_shape_is_unsupported_without_output() {
    let mut input = pc8_header(b"XX");
    input.extend_from_slice(&[0; 64]);
    let mut out = Vec::new();
    let result = convert(
        &mut input.as_slice(),
        &mut out,
        &ConvertOptions::default(),
        OutputFormat::Ppm,
    );
    assert!(matches!(result, Err(ConvertError::UnsupportedCardset(_))));
    assert!(out.is_empty());
}

#[test]
fn conversion_is_deterministic() {
    let input = pc8_cardset();
    let run = || {
        let mut out = Vec::new();
        convert(
            &mut input.as_slice(),
            &mut out,
            &ConvertOptions {
                mode: LayoutMode::MReko,
                back_card: true,
            },
            OutputFormat::Ppm,
        )
        .unwrap();
        out
    };
    assert_eq!(run(), run());
}

#[test]
fn amiga_ham_cards_start_from_palette_zero() {
    let mut palette = vec![0u8; 16 * 3];
    palette[..3].copy_from_slice(&[1, 2, 3]);
    let input = amiga_cardset(0x800, 6, 3, 3, &palette);
    let image = render_atlas(&mut input.as_slice(), &ConvertOptions::default()).unwrap();

    assert_eq!((image.width(), image.height()), (14 * 88, 4 * 130));
    // card 0 -> column 13, row 2
    assert_eq!(*image.get_pixel(13 * 88, 2 * 130), Rgb([1, 2, 3]));
    assert_eq!(*image.get_pixel(13 * 88 + 87, 2 * 130 + 129), Rgb([1, 2, 3]));
    assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
}

#[test]
fn amiga_dt39_drops_cards_without_a_slot() {
    let palette = [9, 9, 9, 200, 200, 200];
    // 68 cards announced, only the 59 placeable ones present
    let input = amiga_cardset(0, 1, 68, 59, &palette);
    let options = ConvertOptions {
        mode: LayoutMode::RekoDt39,
        back_card: false,
    };
    let image = render_atlas(&mut input.as_slice(), &options).unwrap();
    assert_eq!(image.width(), 17 * 88 as u32);
    // card 2 under DT39 -> column 15, row 1
    assert_eq!(*image.get_pixel(15 * 88, 130), Rgb([9, 9, 9]));

    // without the clamp the same stream is short
    let result = render_atlas(&mut input.as_slice(), &ConvertOptions::default());
    assert!(matches!(
        result,
        Err(ConvertError::TruncatedCard { index: 59, .. })
    ));
}

#[test]
fn amiga_dt39_widens_a_small_atlas() {
    let palette = [9, 9, 9, 200, 200, 200];
    let input = amiga_cardset(0, 1, 55, 55, &palette);
    let options = ConvertOptions {
        mode: LayoutMode::RekoDt39,
        back_card: false,
    };
    let mut out = Vec::new();
    convert(&mut input.as_slice(), &mut out, &options, OutputFormat::Ppm).unwrap();
    let header = ppm_header(16 * W, 4 * H);
    assert_eq!(&out[..header.len()], header.as_slice());

    let image = render_atlas(&mut input.as_slice(), &options).unwrap();
    // cards 1 and 2 under DT39 -> columns 14 and 15, row 1
    assert_eq!(*image.get_pixel(14 * 88, 130), Rgb([9, 9, 9]));
    assert_eq!(*image.get_pixel(15 * 88 + 87, 130 + 129), Rgb([9, 9, 9]));

    let normal = render_atlas(&mut input.as_slice(), &ConvertOptions::default()).unwrap();
    assert_eq!(normal.width(), 14 * 88);
}

#[test]
fn truncated_palette_aborts_without_output() {
    // one plane needs two palette entries, only four bytes follow the header
    let input = amiga_cardset(0, 1, 3, 0, &[1, 2, 3, 4]);
    let mut out = Vec::new();
    let result = convert(
        &mut input.as_slice(),
        &mut out,
        &ConvertOptions::default(),
        OutputFormat::Ppm,
    );
    assert!(matches!(result, Err(ConvertError::UnsupportedCardset(_))));
    assert!(out.is_empty());
}

#[test]
fn info_describes_amiga_header() {
    let input = amiga_cardset(0x800, 6, 68, 0, &[]);
    let info = read_info(&mut input.as_slice(), LayoutMode::Normal).unwrap();
    assert_eq!(info.variant, Variant::AmigaBitplane);
    assert_eq!(info.mode_id, Some(0x800));
    assert!(info.ham);
    assert_eq!(info.full_size, 68 * 8_580 + 22 + 16 * 3);
}

#[test]
fn png_output_is_supported() {
    let mut out = Vec::new();
    convert(
        &mut pc8_cardset().as_slice(),
        &mut out,
        &ConvertOptions::default(),
        OutputFormat::Png,
    )
    .unwrap();
    assert_eq!(&out[..4], b"\x89PNG");
}
