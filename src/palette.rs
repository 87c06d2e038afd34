use super::error::{Error, Result};
use super::octree::ColorQuantizer;
use image::{imageops, GrayImage, ImageError, ImageReader, Rgb, RgbImage};
use std::io;
use std::path::Path;
use std::time::Instant;

/// Ordered table of representative colors, at most 256 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Flat `[r, g, b, r, g, b, ...]` table.
    pub fn flat(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }
}

/// Pixel count of a single palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCount {
    pub count: u64,
    pub index: usize,
}

impl ColorCount {
    pub fn rgb(&self, palette: &Palette) -> Result<Rgb<u8>> {
        palette.get(self.index).ok_or(Error::PaletteIndex(self.index))
    }
}

/// Image reduced to palette indices.
pub struct QuantizedImage {
    indices: GrayImage,
    palette: Palette,
}

impl QuantizedImage {
    pub fn quantize(img: &RgbImage, max_colors: usize) -> Self {
        let start_time = Instant::now();
        let quantizer = ColorQuantizer::from(img, max_colors);
        let indices = imageops::index_colors(img, &quantizer);
        let palette = Palette::new(quantizer.into_palette());
        tracing::debug!(
            colors = palette.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "built color palette"
        );
        Self { indices, palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn indices(&self) -> &GrayImage {
        &self.indices
    }

    /// Pixel counts per palette entry in index order. Entries no pixel maps
    /// to are left out.
    pub fn colors(&self) -> Vec<ColorCount> {
        let mut hist = vec![0u64; self.palette.len()];
        for pixel in self.indices.pixels() {
            if let Some(count) = hist.get_mut(pixel[0] as usize) {
                *count += 1;
            }
        }
        hist.into_iter()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(|(index, count)| ColorCount { count, index })
            .collect()
    }
}

/// Opens and decodes the image at `path` as 8-bit RGB.
pub fn open_rgb(path: &Path) -> Result<RgbImage> {
    let decode_err = |source| Error::Decode {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => decode_err(ImageError::IoError(e)),
        })?;
    Ok(reader.decode().map_err(decode_err)?.to_rgb8())
}

pub fn load(path: &Path, max_colors: usize) -> Result<QuantizedImage> {
    let img = open_rgb(path)?;
    tracing::debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    Ok(QuantizedImage::quantize(&img, max_colors))
}

pub fn rgb_to_hex(rgb: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// `(r, g, b)` as printed in the report and the swatch labels.
pub fn rgb_to_tuple(rgb: Rgb<u8>) -> String {
    format!("({}, {}, {})", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(rgb_to_hex(Rgb([0, 0, 0])), "#000000");
        assert_eq!(rgb_to_hex(Rgb([255, 255, 255])), "#ffffff");
        assert_eq!(rgb_to_hex(Rgb([1, 171, 15])), "#01ab0f");
    }

    #[test]
    fn hex_shape_for_all_channel_values() {
        for v in 0..=255u8 {
            for rgb in [Rgb([v, 0, 0]), Rgb([0, v, 0]), Rgb([0, 0, v]), Rgb([v, 255 - v, v / 2])] {
                let hex = rgb_to_hex(rgb);
                assert_eq!(hex.len(), 7);
                assert!(hex.starts_with('#'));
                assert!(hex[1..]
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            }
        }
    }

    #[test]
    fn tuple_format() {
        assert_eq!(rgb_to_tuple(Rgb([128, 0, 7])), "(128, 0, 7)");
    }

    #[test]
    fn histogram_matches_pixels() {
        let img = RgbImage::from_fn(4, 2, |x, _| if x < 3 { Rgb([10, 20, 30]) } else { Rgb([200, 100, 0]) });
        let quantized = QuantizedImage::quantize(&img, 256);
        let colors = quantized.colors();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors.len(), quantized.palette().len());
        assert_eq!(colors.iter().map(|c| c.count).sum::<u64>(), 8);
        for color in &colors {
            let rgb = color.rgb(quantized.palette()).unwrap();
            let expected = if rgb == Rgb([10, 20, 30]) { 6 } else { 2 };
            assert_eq!(color.count, expected);
        }
    }

    #[test]
    fn histogram_is_in_index_order() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 0]));
        let colors = QuantizedImage::quantize(&img, 256).colors();
        assert!(colors.windows(2).all(|w| w[0].index < w[1].index));
    }

    #[test]
    fn empty_image_has_no_colors() {
        let quantized = QuantizedImage::quantize(&RgbImage::new(0, 0), 256);
        assert!(quantized.palette().is_empty());
        assert!(quantized.colors().is_empty());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let palette = Palette::new(vec![Rgb([1, 2, 3])]);
        let color = ColorCount { count: 1, index: 3 };
        assert!(matches!(color.rgb(&palette), Err(Error::PaletteIndex(3))));
        assert_eq!(palette.flat(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load(Path::new("does/not/exist.png"), 256).err().unwrap();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = load(&path, 256).err().unwrap();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
