mod error;
pub mod grid;
mod octree;
pub mod palette;
pub mod report;
pub mod swatch;

pub use self::error::{Error, Result};
pub use self::octree::{ColorQuantizer, MAX_PALETTE_COLORS};
pub use self::palette::{load, rgb_to_hex, ColorCount, Palette, QuantizedImage};
pub use self::report::DEFAULT_OUTPUT_FILE;
pub use self::swatch::{contrast_color, Swatch};

use self::report::ReportWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Options {
    /// Report path.
    pub output_file: PathBuf,
    /// Directory receiving the swatches and the composite. Empty means the
    /// working directory.
    pub out_dir: PathBuf,
    pub max_colors: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            out_dir: PathBuf::new(),
            max_colors: MAX_PALETTE_COLORS,
        }
    }
}

/// What a run wrote to disk.
#[derive(Debug, Default)]
pub struct Summary {
    pub colors: usize,
    pub report: PathBuf,
    pub swatches: Vec<PathBuf>,
    pub composite: Option<PathBuf>,
}

/// Loads `image_path`, then writes the report, the swatches and the
/// composite. Nothing is written when the image cannot be loaded.
pub fn count_colors(image_path: &Path, options: &Options) -> Result<Summary> {
    let quantized = load(image_path, options.max_colors)?;
    write_outputs(&quantized, options)
}

pub fn write_outputs(quantized: &QuantizedImage, options: &Options) -> Result<Summary> {
    let colors = quantized.colors();
    let palette = quantized.palette();

    let mut report = ReportWriter::create(&options.output_file, colors.len())?;
    let mut swatches = Vec::with_capacity(colors.len());
    let mut summary = Summary {
        colors: colors.len(),
        report: options.output_file.clone(),
        ..Default::default()
    };
    for (i, color) in colors.iter().enumerate() {
        let rgb = color.rgb(palette)?;
        report.line(color.count, rgb)?;
        println!("{}", report::console_line(i, color.count, rgb));

        let swatch = Swatch::render(i, rgb, color.count);
        summary.swatches.push(swatch.save(&options.out_dir)?);
        swatches.push(swatch);
    }
    report.finish()?;
    tracing::info!(path = %options.output_file.display(), colors = colors.len(), "wrote report");

    if let Some(canvas) = grid::compose(swatches.iter().map(|s| &s.image)) {
        let path = options.out_dir.join(grid::COMPOSITE_FILE);
        canvas.save(&path).map_err(|source| Error::Save {
            path: path.clone(),
            source,
        })?;
        println!("All the colors saved in {}", path.display());
        summary.composite = Some(path);
    }
    Ok(summary)
}
