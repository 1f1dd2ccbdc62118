//! Rasterizer tests against a real headless Chrome

use certpress::{new_rasterizer, RasterConfig, Strategy};

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="200">
  <rect width="400" height="200" fill="#f5efe0"/>
  <text x="200" y="110" text-anchor="middle" font-size="28">JANE DOE</text>
</svg>"##;

#[test]
#[ignore] // Requires Chrome to be installed
fn per_call_capture_writes_exactly_one_file() {
    let dest = tempfile::tempdir().unwrap();

    let mut raster =
        new_rasterizer(Strategy::PerCall, RasterConfig::default()).expect("failed to launch");
    let path = raster
        .rasterize(SVG, dest.path(), "certificate.png")
        .expect("rasterization failed");
    raster.close().unwrap();

    assert_eq!(path, dest.path().join("certificate.png"));
    let entries: Vec<_> = std::fs::read_dir(dest.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    // PNG files start with these magic bytes
    let png = std::fs::read(&path).unwrap();
    assert!(png.len() > 100, "PNG data seems too small");
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
#[ignore] // Requires Chrome and network access for the export script
fn shared_download_pipeline_round_trip() {
    let dest = tempfile::tempdir().unwrap();

    let mut raster =
        new_rasterizer(Strategy::Shared, RasterConfig::default()).expect("failed to launch");
    let first = raster
        .rasterize(SVG, dest.path(), "certificate.png")
        .expect("first rasterization failed");
    assert!(first.exists());

    // Reuses the same browser; the earlier file is replaced, not aliased.
    let second = raster
        .rasterize(SVG, dest.path(), "certificate.png")
        .expect("second rasterization failed");
    assert_eq!(first, second);
    let entries: Vec<_> = std::fs::read_dir(dest.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    raster.close().unwrap();
}

#[test]
#[ignore] // Requires Chrome to be installed
fn shared_pipeline_times_out_without_export() {
    let dest = tempfile::tempdir().unwrap();

    // A markup-only page never triggers a download when the export script
    // cannot rasterize anything (empty markup renders a zero-size node), so
    // keep the budget short and expect the bounded wait to fail.
    let config = RasterConfig {
        timeout_ms: 2_000,
        ..RasterConfig::default()
    };
    let mut raster = new_rasterizer(Strategy::Shared, config).expect("failed to launch");
    let err = raster
        .rasterize("", dest.path(), "certificate.png")
        .unwrap_err();
    assert!(matches!(err, certpress::Error::Timeout(2_000, _)));
    assert!(!dest.path().join("certificate.png").exists());

    raster.close().unwrap();
}
