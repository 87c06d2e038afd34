use super::error::{Error, Result};
use super::palette::{rgb_to_hex, rgb_to_tuple};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

pub const SWATCH_WIDTH: u32 = 200;
pub const SWATCH_HEIGHT: u32 = 100;
const LABEL_OFFSET: (u32, u32) = (10, 10);
const GLYPH_SIZE: u32 = 8;
const LINE_SPACING: u32 = 4;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Black on light backgrounds, white on dark ones.
pub fn contrast_color(rgb: Rgb<u8>) -> Rgb<u8> {
    let luminance =
        (0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64) / 255.0;
    if luminance > 0.5 {
        BLACK
    } else {
        WHITE
    }
}

/// Draws `text` with the built-in 8x8 font. Newlines start a new line at
/// the original x offset; pixels past the canvas edge are dropped.
pub fn draw_text(img: &mut RgbImage, (x, y): (u32, u32), text: &str, color: Rgb<u8>) {
    for (row, line) in text.lines().enumerate() {
        let top = y + row as u32 * (GLYPH_SIZE + LINE_SPACING);
        for (col, ch) in line.chars().enumerate() {
            let left = x + col as u32 * GLYPH_SIZE;
            let Some(glyph) = BASIC_FONTS.get(ch) else {
                continue;
            };
            for (gy, bits) in glyph.iter().enumerate() {
                for gx in 0..GLYPH_SIZE {
                    if (bits >> gx) & 1 == 0 {
                        continue;
                    }
                    let (px, py) = (left + gx, top + gy as u32);
                    if px < img.width() && py < img.height() {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
}

/// Sample image of one palette color with its label.
pub struct Swatch {
    pub index: usize,
    pub color: Rgb<u8>,
    pub count: u64,
    pub image: RgbImage,
}

impl Swatch {
    pub fn label(index: usize, color: Rgb<u8>, count: u64) -> String {
        format!(
            "Color {index}\nRGB: {}\nHEX: {}\nCount: {count}",
            rgb_to_tuple(color),
            rgb_to_hex(color)
        )
    }

    pub fn render(index: usize, color: Rgb<u8>, count: u64) -> Self {
        let mut image = RgbImage::from_pixel(SWATCH_WIDTH, SWATCH_HEIGHT, color);
        draw_text(
            &mut image,
            LABEL_OFFSET,
            &Self::label(index, color, count),
            contrast_color(color),
        );
        Self {
            index,
            color,
            count,
            image,
        }
    }

    /// `color_0{i}.png`; only a literal zero is prepended, whatever the index.
    pub fn file_name(index: usize) -> String {
        format!("color_0{index}.png")
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(self.index));
        self.image.save(&path).map_err(|source| Error::Save {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
