use image::{imageops, Rgb, RgbImage};

pub const COLUMNS: u32 = 4;
pub const COMPOSITE_FILE: &str = "all_colors.png";

/// Top-left corner of grid cell `index` for tiles of `width` x `height`.
pub fn cell_origin(index: usize, width: u32, height: u32) -> (u32, u32) {
    let index = index as u32;
    ((index % COLUMNS) * width, (index / COLUMNS) * height)
}

/// Tiles `tiles` left to right, top to bottom, `COLUMNS` per row on a white
/// canvas. Tiles share the size of the first one. Returns `None` when there
/// is nothing to tile.
pub fn compose<'a, I>(tiles: I) -> Option<RgbImage>
where
    I: IntoIterator<Item = &'a RgbImage>,
    I::IntoIter: ExactSizeIterator,
{
    let mut tiles = tiles.into_iter().peekable();
    let count = tiles.len() as u32;
    let (width, height) = tiles.peek()?.dimensions();
    let rows = count.div_ceil(COLUMNS);
    let mut canvas = RgbImage::from_pixel(COLUMNS * width, rows * height, Rgb([255, 255, 255]));
    for (index, tile) in tiles.enumerate() {
        let (x, y) = cell_origin(index, width, height);
        imageops::replace(&mut canvas, tile, x as i64, y as i64);
    }
    Some(canvas)
}
