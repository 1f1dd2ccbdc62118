//! Certpress
//!
//! A batch tool that renders personalized event certificates from a CSV
//! roster and an SVG template, then emails each recipient their certificate
//! as an attachment.
//!
//! Rendering drives a real headless Chrome instance so the output matches
//! what a browser would draw (fonts, gradients, filters), instead of
//! re-implementing SVG/CSS layout. The browser exports the image through its
//! download subsystem, which has no completion callback, so the engine polls
//! the filesystem for the expected file with a bounded wait.
//!
//! # Example
//!
//! ```no_run
//! use certpress::{new_rasterizer, RasterConfig, Strategy};
//! use std::path::Path;
//!
//! # fn main() -> certpress::Result<()> {
//! let mut rasterizer = new_rasterizer(Strategy::Shared, RasterConfig::default())?;
//! let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"/>"#;
//! let png = rasterizer.rasterize(svg, Path::new("out/jane@example.com"), "certificate.png")?;
//! println!("wrote {}", png.display());
//! rasterizer.close()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod roster;
pub mod template;

pub mod hostdoc;
pub mod poll;

// Rasterizer backends
pub mod cdp;
pub mod snapshot;

pub mod batch;
pub mod dispatch;
pub mod mail;

/// Configuration for a rasterizer backend
///
/// The defaults match the reference pipeline: a 20 second download wait,
/// a 250ms poll interval, and a 5x export scale for crisp print output.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Browser window dimensions
    pub viewport: Viewport,
    /// Bound on the wait for the exported file, in milliseconds
    pub timeout_ms: u64,
    /// Interval between filesystem polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Canvas export scale factor (raster pixels per CSS pixel)
    pub scale: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 20_000,
            poll_interval_ms: 250,
            scale: 5,
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Core trait for rasterizer backends
///
/// A rasterizer turns a markup string (SVG or an HTML fragment) into a PNG
/// file in `dest_dir`. On success exactly one file named `file_name` exists
/// there; image content is not validated. Implementations are not safe for
/// concurrent use, so the batch orchestrator serializes all calls.
pub trait Rasterizer {
    /// Render `markup` to `dest_dir/file_name`, returning the written path.
    ///
    /// The destination directory is created if missing and a pre-existing
    /// file with the same name is removed first. The temporary host document
    /// used to load the markup into the browser is deleted on every exit
    /// path, including timeout.
    fn rasterize(&mut self, markup: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf>;

    /// Shut down the backend and release any browser process it holds.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Which rasterizer backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One shared browser process reused across the batch (fast, default).
    /// Exports via an in-page canvas script and the download subsystem.
    Shared,
    /// A fresh browser process per call (far slower, no cross-call state).
    /// Exports via the browser's native page capture.
    PerCall,
}

/// Create a rasterizer for the given strategy
pub fn new_rasterizer(strategy: Strategy, config: RasterConfig) -> Result<Box<dyn Rasterizer>> {
    match strategy {
        Strategy::Shared => Ok(Box::new(cdp::CdpRasterizer::new(config)?)),
        Strategy::PerCall => Ok(Box::new(snapshot::SnapshotRasterizer::new(config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RasterConfig::default();
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.scale, 5);
    }

    #[test]
    fn test_viewport() {
        let viewport = Viewport {
            width: 1920,
            height: 1080,
        };
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }
}
