//! Shared-instance rasterizer over the Chrome DevTools Protocol
//!
//! This is the primary backend: it launches one headless Chrome process and
//! reuses a single tab for every certificate in the batch. Each call routes
//! the browser's downloads into the destination directory, navigates the tab
//! to a temporary host document whose in-page script exports the markup as a
//! PNG download, and then polls the filesystem until the file appears.
//!
//! The download subsystem gives the controlling process no completion
//! callback, so the poll is the only synchronization point. Calls must be
//! serialized by the owner; the tab is a single mutable resource.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info};

use crate::{hostdoc, poll, Error, RasterConfig, Rasterizer, Result};

/// CDP-backed rasterizer holding one browser process for the batch lifetime.
pub struct CdpRasterizer {
    browser: Browser,
    tab: Arc<Tab>,
    config: RasterConfig,
}

impl CdpRasterizer {
    pub fn new(config: RasterConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::Browser(format!("failed to build launch options: {e}")))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Browser(format!("failed to launch browser: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Browser(format!("failed to create tab: {e}")))?;

        info!("launched shared headless browser");
        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    /// Point Chrome's download subsystem at `dest_dir`.
    fn allow_downloads_into(&self, dest_dir: &Path) -> Result<()> {
        // Chrome rejects relative download paths.
        let absolute = fs::canonicalize(dest_dir)?;
        self.tab
            .call_method(Page::SetDownloadBehavior {
                behavior: Page::SetDownloadBehaviorBehaviorOption::Allow,
                download_path: Some(absolute.display().to_string()),
            })
            .map_err(|e| Error::Browser(format!("failed to set download behavior: {e}")))?;
        Ok(())
    }
}

impl Rasterizer for CdpRasterizer {
    fn rasterize(&mut self, markup: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)?;
        let expected = dest_dir.join(file_name);

        // A leftover file from an earlier run would satisfy the poll
        // immediately and make Chrome save under a "name (1).png" alias.
        if expected.exists() {
            fs::remove_file(&expected)?;
        }

        self.allow_downloads_into(dest_dir)?;

        let document = hostdoc::export_document(markup, file_name, self.config.scale);
        // Dropped on every exit path below, deleting the host document.
        let host = hostdoc::write_temp(&document)?;
        let url = hostdoc::file_url(&host)?;

        self.tab
            .navigate_to(url.as_str())
            .map_err(|e| Error::Browser(format!("navigation failed: {e}")))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Browser(format!("wait for navigation failed: {e}")))?;

        debug!("waiting for download of {}", expected.display());
        poll::wait_for_file(
            &expected,
            Duration::from_millis(self.config.poll_interval_ms),
            Duration::from_millis(self.config.timeout_ms),
        )?;

        Ok(expected)
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping the browser terminates the child Chrome process.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RasterConfig;

    #[test]
    fn test_cdp_rasterizer_creation() {
        // This test requires Chrome to be installed, so we skip it in CI
        if std::env::var("CI").is_ok() {
            return;
        }
        match CdpRasterizer::new(RasterConfig::default()) {
            Ok(raster) => Box::new(raster).close().unwrap(),
            Err(e) => {
                eprintln!("skipping: Chrome unavailable or failed to launch: {e}");
            }
        }
    }
}
