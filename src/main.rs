use clap::Parser;
use colors_counter::{count_colors, Error, Options, DEFAULT_OUTPUT_FILE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Arguments are missing. The call should be in the format: colors-counter image.png [output.txt]";

/// Count image pixels per palette color and render color swatches
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path
    img: Option<PathBuf>,

    /// Report output path
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Maximum number of palette colors
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u16).range(1..=256))]
    colors: u16,

    /// Directory for the swatch images and the composite
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colors_counter=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    let Some(img) = args.img else {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    };
    let options = Options {
        output_file: args.output,
        out_dir: args.out_dir.unwrap_or_default(),
        max_colors: args.colors as usize,
    };

    match count_colors(&img, &options) {
        Ok(summary) => {
            tracing::info!(
                colors = summary.colors,
                swatches = summary.swatches.len(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(Error::NotFound(_)) => {
            println!("File not found.");
            ExitCode::SUCCESS
        }
        Err(e @ Error::Decode { .. }) => {
            println!("Error opening file: {e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e}", img.to_string_lossy());
            ExitCode::FAILURE
        }
    }
}
