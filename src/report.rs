use super::error::{Error, Result};
use super::palette::{rgb_to_hex, rgb_to_tuple};
use image::Rgb;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "count.txt";

const SEPARATOR: &str = "---------------------------------------------";
const SIGNATURE: &str = "image colors counter by nodeus 2018-2025";

/// Writes the count report: header, one line per color, trailer.
pub struct ReportWriter<W: Write> {
    w: W,
    path: PathBuf,
}

impl ReportWriter<BufWriter<File>> {
    /// Creates (or truncates) the report file and writes the header.
    pub fn create(path: &Path, color_count: usize) -> Result<Self> {
        let file = File::create(path).map_err(|source| Error::Report {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufWriter::new(file), path, color_count)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(w: W, path: &Path, color_count: usize) -> Result<Self> {
        let mut report = Self {
            w,
            path: path.to_path_buf(),
        };
        report.wrap(|w| {
            write!(
                w,
                "Number of colors in image = {color_count}\n\nPixel count by color:\n\n"
            )
        })?;
        Ok(report)
    }

    pub fn line(&mut self, count: u64, rgb: Rgb<u8>) -> Result<()> {
        self.wrap(|w| writeln!(w, "{count} {} {}", rgb_to_tuple(rgb), rgb_to_hex(rgb)))
    }

    /// Writes the trailer and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.wrap(|w| {
            write!(w, "\n{SEPARATOR}\n{SIGNATURE}")?;
            w.flush()
        })?;
        Ok(self.w)
    }

    fn wrap<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        f(&mut self.w).map_err(|source| Error::Report {
            path: self.path.clone(),
            source,
        })
    }
}

/// Console counterpart of a report line.
pub fn console_line(index: usize, count: u64, rgb: Rgb<u8>) -> String {
    format!(
        "Color {index}: {} {} - {count} pixels",
        rgb_to_tuple(rgb),
        rgb_to_hex(rgb)
    )
}
