//! TOML configuration for the certificate and email phases
//!
//! The config file carries two sections: `[certificate]` describes the event
//! and feeds the render context; `[email]` holds the SMTP relay, sender
//! credential, and subject line used by the dispatch phase.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::{Error, Result};

/// Default width of the dispatch worker pool
pub const DEFAULT_WORKERS: usize = 10;

fn default_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub certificate: CertificateConfig,
    pub email: EmailConfig,
}

/// `[certificate]` section
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateConfig {
    /// Event name, e.g. "Lakeside Marathon"
    pub marathon: String,
    /// Event date in ISO form (YYYY-MM-DD)
    pub date: String,
    /// Certificate title line
    pub title: String,
}

/// `[email]` section
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Sender address, also the SMTP username
    pub sender: String,
    /// SMTP credential for the sender
    pub password: String,
    /// Subject line for every outgoing message
    pub subject: String,
    /// Mail relay host, contacted over implicit TLS on port 465
    #[serde(default = "default_relay")]
    pub relay: String,
    /// Width of the dispatch worker pool
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Directory of fixed extra attachments added to every message
    #[serde(default)]
    pub attachments_dir: Option<PathBuf>,
}

impl Config {
    /// Load and parse the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

impl CertificateConfig {
    /// Build the shared render context merged into every recipient's
    /// template context.
    ///
    /// Besides the raw section values this derives the display strings the
    /// templates use: `heading` (upper-cased event name), `humanized_date`
    /// ("June 3, 2024"), `cert_title`, and `year`.
    pub fn context(&self) -> Result<HashMap<String, String>> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| Error::Config(format!("certificate.date `{}`: {e}", self.date)))?;

        let mut ctx = HashMap::new();
        ctx.insert("marathon".to_string(), self.marathon.clone());
        ctx.insert("date".to_string(), self.date.clone());
        ctx.insert("title".to_string(), self.title.clone());
        ctx.insert("heading".to_string(), self.marathon.to_uppercase());
        ctx.insert(
            "humanized_date".to_string(),
            date.format("%B %-d, %Y").to_string(),
        );
        ctx.insert("cert_title".to_string(), self.title.clone());
        ctx.insert("year".to_string(), date.year().to_string());
        Ok(ctx)
    }
}
