//! Per-call rasterizer using native page capture
//!
//! The alternate backend: every call launches a fresh headless Chrome,
//! loads a plain host document, captures the page with the browser's own
//! screenshot command, and writes the PNG bytes to the destination itself.
//! Far slower than the shared backend (a full browser start and teardown
//! per certificate) but nothing leaks from one call into the next.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use log::info;

use crate::{hostdoc, Error, RasterConfig, Rasterizer, Result};

/// Rasterizer that creates and tears down a browser instance per call.
pub struct SnapshotRasterizer {
    config: RasterConfig,
}

impl SnapshotRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }
}

impl Rasterizer for SnapshotRasterizer {
    fn rasterize(&mut self, markup: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)?;
        let expected = dest_dir.join(file_name);
        if expected.exists() {
            fs::remove_file(&expected)?;
        }

        let document = hostdoc::plain_document(markup);
        // Dropped on every exit path below, deleting the host document.
        let host = hostdoc::write_temp(&document)?;
        let url = hostdoc::file_url(&host)?;

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((self.config.viewport.width, self.config.viewport.height)))
            .build()
            .map_err(|e| Error::Browser(format!("failed to build launch options: {e}")))?;
        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Browser(format!("failed to launch browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::Browser(format!("failed to create tab: {e}")))?;
        tab.set_default_timeout(Duration::from_millis(self.config.timeout_ms));

        tab.navigate_to(url.as_str())
            .map_err(|e| Error::Browser(format!("navigation failed: {e}")))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::Browser(format!("wait for navigation failed: {e}")))?;

        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::Browser(format!("screenshot failed: {e}")))?;
        fs::write(&expected, png)?;

        info!("captured {}", expected.display());
        Ok(expected)
    }

    fn close(self: Box<Self>) -> Result<()> {
        // No long-lived browser to release.
        Ok(())
    }
}
