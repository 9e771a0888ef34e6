//! End-to-end runs of the `fakespm` binary in a scratch directory.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::{Command, Output};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

fn write_uniform_png(path: &Path, width: u32, height: u32, value: u8) {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
        .save(path)
        .unwrap();
}

fn fakespm(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fakespm"))
        .args(args)
        .current_dir(dir.path())
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn uniform_image_renders_flat_with_scale_bar() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 100, 100, 128);

    let out = fakespm(
        &dir,
        &[
            "gray.png",
            "--noise=0",
            "--blur=1",
            "--lines=0",
            "--contrast=(0,100)",
        ],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let png = image::open(dir.path().join("spm_out.png")).unwrap().to_rgb8();
    assert_eq!(png.dimensions(), (100, 100));
    assert!(!dir.path().join("spm_out.txt").exists());

    let background = *png.get_pixel(0, 0);
    let black = Rgb([0, 0, 0]);
    let mut overlay = 0;
    for (x, y, p) in png.enumerate_pixels() {
        if *p == black {
            // Bar and label live in the lower-right quadrant.
            assert!(x >= 50 && y >= 50, "overlay pixel at ({x}, {y})");
            overlay += 1;
        } else {
            assert_eq!(*p, background, "pixel ({x}, {y}) differs");
        }
    }
    assert!(overlay > 0, "no scale bar drawn");
    assert!(overlay < 500, "overlay covers {overlay} pixels");
}

#[test]
fn missing_input_fails_without_output() {
    let dir = TempDir::new().unwrap();

    let out = fakespm(&dir, &["missing.jpg"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to load image"), "stderr: {stderr}");
    assert!(!dir.path().join("spm_out.png").exists());
}

#[test]
fn undecodable_input_fails_without_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("junk.png"), b"not an image").unwrap();

    let out = fakespm(&dir, &["junk.png"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to load image"), "stderr: {stderr}");
    assert!(!dir.path().join("spm_out.png").exists());
}

#[test]
fn txt_out_writes_one_line_per_row() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 100, 100, 90);

    let out = fakespm(&dir, &["gray.png", "--txt_out=true"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let png = image::open(dir.path().join("spm_out.png")).unwrap();
    // Default blur averages 5x5 blocks.
    assert_eq!((png.width(), png.height()), (20, 20));

    let text = std::fs::read_to_string(dir.path().join("spm_out.txt")).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 20);
    for row in rows {
        let values: Vec<f64> = row.split(' ').map(|t| t.parse().unwrap()).collect();
        assert_eq!(values.len(), 20);
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn bare_txt_out_flag_enables_text() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 30, 20, 200);

    let out = fakespm(&dir, &["gray.png", "--blur=2", "--txt-out"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = std::fs::read_to_string(dir.path().join("spm_out.txt")).unwrap();
    assert_eq!(text.lines().count(), 10);
}

#[test]
fn invalid_blur_is_rejected_before_reading() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 10, 10, 128);

    let out = fakespm(&dir, &["gray.png", "--blur=0"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid parameter"), "stderr: {stderr}");
    assert!(!dir.path().join("spm_out.png").exists());
}

#[test]
fn negative_blur_is_rejected_as_invalid_parameter() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 10, 10, 128);

    let out = fakespm(&dir, &["gray.png", "--blur=-1"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid parameter"), "stderr: {stderr}");
    assert!(!dir.path().join("spm_out.png").exists());
}

#[test]
fn inverted_contrast_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_uniform_png(&dir.path().join("gray.png"), 10, 10, 128);

    let out = fakespm(&dir, &["gray.png", "--contrast=(98,0.1)"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("spm_out.png").exists());
}

#[test]
fn malformed_flag_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let out = fakespm(&dir, &["gray.png", "--blur=many"]);
    assert_eq!(out.status.code(), Some(2));
}
