use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_colors-counter"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn four_colors(path: &Path) {
    let colors = [
        Rgb([255, 0, 0]),
        Rgb([0, 255, 0]),
        Rgb([0, 0, 255]),
        Rgb([255, 255, 255]),
    ];
    RgbImage::from_fn(2, 2, |x, y| colors[(y * 2 + x) as usize])
        .save(path)
        .unwrap();
}

#[test]
fn no_arguments_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Arguments are missing."));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["nope.png"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "File not found.");
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn undecodable_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.png"), b"not a png").unwrap();
    let output = run(dir.path(), &["bad.png"]);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Error opening file: "));
    assert_eq!(file_names(dir.path()), ["bad.png"]);
}

#[test]
fn four_color_image_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    four_colors(&dir.path().join("in.png"));

    let output = run(dir.path(), &["in.png"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Color ")).count(), 4);
    assert!(stdout.contains("All the colors saved in all_colors.png"));

    assert_eq!(
        file_names(dir.path()),
        [
            "all_colors.png",
            "color_00.png",
            "color_01.png",
            "color_02.png",
            "color_03.png",
            "count.txt",
            "in.png",
        ]
    );

    let report = fs::read_to_string(dir.path().join("count.txt")).unwrap();
    assert!(report.starts_with("Number of colors in image = 4\n"));
    for line in ["1 (255, 0, 0) #ff0000", "1 (0, 255, 0) #00ff00", "1 (0, 0, 255) #0000ff"] {
        assert!(report.lines().any(|l| l == line), "missing {line}");
    }
    assert!(report.ends_with("image colors counter by nodeus 2018-2025"));

    let composite = image::open(dir.path().join("all_colors.png")).unwrap().to_rgb8();
    assert_eq!(composite.dimensions(), (800, 100));
    let swatch = image::open(dir.path().join("color_00.png")).unwrap().to_rgb8();
    assert_eq!(swatch.dimensions(), (200, 100));
    assert_eq!(composite.get_pixel(0, 0), swatch.get_pixel(0, 0));
}

#[test]
fn custom_report_path_and_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    four_colors(&dir.path().join("in.png"));
    fs::create_dir(dir.path().join("out")).unwrap();

    let output = run(dir.path(), &["in.png", "colors.txt", "--out-dir", "out", "--colors", "1"]);
    assert!(output.status.success());

    let report = fs::read_to_string(dir.path().join("colors.txt")).unwrap();
    assert!(report.starts_with("Number of colors in image = 1\n"));
    assert_eq!(
        file_names(&dir.path().join("out")),
        ["all_colors.png", "color_00.png"]
    );
}

#[test]
fn unwritable_report_fails() {
    let dir = tempfile::tempdir().unwrap();
    four_colors(&dir.path().join("in.png"));
    let output = run(dir.path(), &["in.png", "missing/count.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to write report"));
}
