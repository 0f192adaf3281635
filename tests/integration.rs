use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use campus_palette::analysis::{LocalAnalyzer, ReplayAnalyzer};
use campus_palette::catalog::{Catalog, Category, CategoryFilter};
use campus_palette::color::Color;
use campus_palette::sampler::{Bounds, Point};
use campus_palette::session::ExtractionSession;
use campus_palette::PaletteError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 64x32 image: left half crimson, right half wisdom blue.
fn create_two_tone(path: &Path) {
    let img = image::RgbImage::from_fn(64, 32, |x, _| {
        if x < 32 {
            image::Rgb([150, 25, 28])
        } else {
            image::Rgb([0, 63, 135])
        }
    });
    img.save(path).unwrap();
}

fn create_colorful(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let region = (x / 16) + (y / 16) * 4;
        match region % 8 {
            0 => image::Rgb([220, 50, 50]),
            1 => image::Rgb([50, 200, 50]),
            2 => image::Rgb([50, 50, 220]),
            3 => image::Rgb([220, 220, 50]),
            4 => image::Rgb([200, 50, 200]),
            5 => image::Rgb([50, 200, 200]),
            6 => image::Rgb([20, 20, 20]),
            _ => image::Rgb([240, 240, 240]),
        }
    });
    img.save(path).unwrap();
}

struct Fixtures {
    _dir: tempfile::TempDir,
    two_tone: PathBuf,
    colorful: PathBuf,
    not_an_image: PathBuf,
    response: PathBuf,
}

fn fixtures() -> Fixtures {
    let dir = tempfile::tempdir().unwrap();
    let two_tone = dir.path().join("two-tone.png");
    create_two_tone(&two_tone);
    let colorful = dir.path().join("colorful.png");
    create_colorful(&colorful);
    let not_an_image = dir.path().join("not_an_image.txt");
    std::fs::write(&not_an_image, "this is not an image").unwrap();
    let response = dir.path().join("response.json");
    std::fs::write(
        &response,
        r##"[
            {"hex": "#B24E3D", "paletteCode": "PANTONE 18-1448 TCX", "label": "砖红"},
            {"hex": "#4a90e2", "paletteCode": "PANTONE 16-4132 TCX"}
        ]"##,
    )
    .unwrap();
    Fixtures {
        _dir: dir,
        two_tone,
        colorful,
        not_an_image,
        response,
    }
}

// ---------------------------------------------------------------------------
// Session tests
// ---------------------------------------------------------------------------

#[test]
fn repeated_samples_are_most_recent_first_with_distinct_ids() {
    let fx = fixtures();
    let mut session = ExtractionSession::with_baseline();
    session.load_image(std::fs::read(&fx.two_tone).unwrap()).unwrap();

    let bounds = Bounds::new(0.0, 0.0, 640.0, 320.0);
    let clicks = [10.0, 630.0, 100.0, 400.0];
    let mut ids = Vec::new();
    for x in clicks {
        ids.push(session.request_manual_sample(bounds, Point::new(x, 5.0)).unwrap());
    }

    let entries = session.catalog().entries();
    let head: Vec<&str> = entries[..4].iter().map(|e| e.id.as_str()).collect();
    let expected: Vec<&str> = ids.iter().rev().map(String::as_str).collect();
    assert_eq!(head, expected);

    let unique: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(unique.len(), entries.len());

    let tail: Vec<&str> = entries[4..].iter().map(|e| e.id.as_str()).collect();
    let baseline = Catalog::baseline();
    let original: Vec<&str> = baseline.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(tail, original);

    assert_eq!(entries[0].color, Color::new(0, 63, 135));
    assert_eq!(entries[1].color, Color::new(150, 25, 28));
}

#[test]
fn rgb_always_agrees_with_hex() {
    let fx = fixtures();
    let mut session = ExtractionSession::with_baseline();
    session.load_image(std::fs::read(&fx.colorful).unwrap()).unwrap();
    session
        .request_automatic_extraction(&LocalAnalyzer::default())
        .unwrap();
    for entry in session.catalog().entries() {
        let parsed = Color::from_hex(&entry.hex()).unwrap();
        assert_eq!(parsed.r, entry.rgb()[0]);
        assert_eq!(parsed.g, entry.rgb()[1]);
        assert_eq!(parsed.b, entry.rgb()[2]);
    }
}

#[test]
fn replayed_extraction_lands_in_campus_category() {
    let fx = fixtures();
    let mut session = ExtractionSession::with_baseline();
    session.load_image(std::fs::read(&fx.two_tone).unwrap()).unwrap();
    let analyzer = ReplayAnalyzer::from_file(&fx.response).unwrap();
    let ids = session.request_automatic_extraction(&analyzer).unwrap();
    assert_eq!(ids.len(), 2);

    let campus: Vec<_> = session
        .catalog()
        .filter(CategoryFilter::Only(Category::Campus))
        .collect();
    assert_eq!(campus.len(), 2);
    assert_eq!(campus[0].hex(), "#B24E3D");
    assert_eq!(campus[1].hex(), "#4A90E2");
    assert_eq!(campus[0].short_name(), "砖红");
}

#[test]
fn busy_flag_blocks_until_resolution() {
    let fx = fixtures();
    let mut session = ExtractionSession::with_baseline();
    session.load_image(std::fs::read(&fx.two_tone).unwrap()).unwrap();

    let pending = session.begin_automatic_extraction().unwrap();
    assert_eq!(session.begin_automatic_extraction().unwrap_err(), PaletteError::Busy);
    let analyzer = ReplayAnalyzer::new("[]");
    assert_eq!(
        session.request_automatic_extraction(&analyzer).unwrap_err(),
        PaletteError::Busy
    );

    let response = std::fs::read_to_string(&fx.response).unwrap();
    session
        .complete_automatic_extraction(pending, Ok::<_, String>(response))
        .unwrap();
    assert!(!session.is_busy());
    assert!(session
        .request_manual_sample(Bounds::new(0.0, 0.0, 64.0, 32.0), Point::new(1.0, 1.0))
        .is_ok());
}

// ---------------------------------------------------------------------------
// CLI integration tests (run the actual binary)
// ---------------------------------------------------------------------------

fn cargo_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_campus-palette"))
}

#[test]
fn cli_list_filters_by_category() {
    let output = Command::new(cargo_bin())
        .args(["list", "--category", "official"])
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("#96191C"));
    assert!(stdout.contains("#003F87"));
}

#[test]
fn cli_show_prints_cmyk() {
    let output = Command::new(cargo_bin())
        .args(["show", "1"])
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("C 0 / M 83 / Y 81 / K 41"));
    assert!(stdout.contains("150, 25, 28"));
}

#[test]
fn cli_show_unknown_id_fails() {
    let output = Command::new(cargo_bin())
        .args(["show", "999"])
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no color with id"), "got: {stderr}");
}

#[test]
fn cli_sample_reads_pixel() {
    let fx = fixtures();
    let output = Command::new(cargo_bin())
        .arg("sample")
        .arg(&fx.two_tone)
        .args(["--x", "50", "--y", "3"])
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#003F87"), "got: {stdout}");
    assert!(stdout.contains("Manual Sample"));
}

#[test]
fn cli_extract_with_replayed_response() {
    let fx = fixtures();
    let output = Command::new(cargo_bin())
        .arg("extract")
        .arg(&fx.two_tone)
        .arg("--response")
        .arg(&fx.response)
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("#B24E3D"));
}

#[test]
fn cli_file_not_found_error() {
    let output = Command::new(cargo_bin())
        .args(["extract", "/nonexistent/image.png"])
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"), "got: {stderr}");
}

#[test]
fn cli_unsupported_format_error() {
    let fx = fixtures();
    let output = Command::new(cargo_bin())
        .arg("sample")
        .arg(&fx.not_an_image)
        .args(["--x", "0", "--y", "0"])
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot decode image"), "got: {stderr}");
}

#[test]
fn cli_rejects_zero_colors_and_small_preview() {
    let fx = fixtures();
    let output = Command::new(cargo_bin())
        .arg("extract")
        .arg(&fx.two_tone)
        .args(["--colors", "0"])
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least one color"), "got: {stderr}");

    let output = Command::new(cargo_bin())
        .args(["--preview-capacity", "2", "list"])
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least 6"), "got: {stderr}");
}

#[test]
fn cli_help_output() {
    let output = Command::new(cargo_bin())
        .arg("--help")
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["list", "show", "sample", "extract", "browse"] {
        assert!(stdout.contains(sub), "help missing '{sub}'");
    }
    assert!(stdout.contains("--preview-capacity"));
}
